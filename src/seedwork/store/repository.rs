use async_trait::async_trait;
use uuid::Uuid;

use crate::seedwork::core::{AggregateRoot, DomainError};

/// Generic repository contract shared by every aggregate.
///
/// A repository is always bound to one transactional scope: `save` and
/// `delete` only stage mutations, which become visible to other scopes when
/// the owning unit of work commits.
#[async_trait]
pub trait Repository<A: AggregateRoot>: Send + Sync {
    /// Load an aggregate, failing with `NotFound` when absent.
    async fn get(&self, id: Uuid) -> Result<A, DomainError>;

    /// Stage an insert (new aggregate) or update and collect its pending
    /// domain events for publication after commit.
    async fn save(&mut self, aggregate: &mut A) -> Result<(), DomainError>;

    /// Stage removal of an aggregate, failing with `NotFound` when absent.
    async fn delete(&mut self, id: Uuid) -> Result<(), DomainError>;
}
