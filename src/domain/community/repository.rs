use async_trait::async_trait;
use uuid::Uuid;

use crate::seedwork::{DomainError, Repository};
use super::aggregate::Community;

/// Community-specific persistence operations on top of [`Repository`].
#[async_trait]
pub trait CommunityRepository: Repository<Community> {
    /// A transient community owned by `created_by`, not yet staged.
    fn get_new_instance(&self, name: &str, created_by: Uuid) -> Result<Community, DomainError>;

    /// Find the community served from `domain` (primary or white-label).
    async fn get_by_domain(&self, domain: &str) -> Result<Community, DomainError>;
}
