use async_trait::async_trait;

use crate::seedwork::{DomainError, Repository};
use super::aggregate::VendorUser;

#[async_trait]
pub trait VendorUserRepository: Repository<VendorUser> {
    /// A transient vendor user. Fails with `Validation` on bad creation fields.
    fn get_new_instance(
        &self,
        external_id: &str,
        last_name: &str,
        first_name: Option<&str>,
    ) -> Result<VendorUser, DomainError>;

    async fn get_by_external_id(&self, external_id: &str) -> Result<VendorUser, DomainError>;
}
