use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::vendor_user::{ExternalId, FirstName, LastName, VendorUser, VendorUserRepository};
use crate::seedwork::DomainError;
use super::repository::InMemoryRepository;

#[async_trait]
impl VendorUserRepository for InMemoryRepository<VendorUser> {
    fn get_new_instance(
        &self,
        external_id: &str,
        last_name: &str,
        first_name: Option<&str>,
    ) -> Result<VendorUser, DomainError> {
        let external_id = ExternalId::new(external_id)?;
        let last_name = LastName::new(last_name)?;
        let first_name = first_name.map(FirstName::new).transpose()?;
        Ok(VendorUser::create(
            Uuid::now_v7(),
            external_id,
            last_name,
            first_name,
            self.passport().clone(),
        ))
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<VendorUser, DomainError> {
        let wanted = external_id.trim().to_string();
        self.find_one(move |props| props.external_id.as_str() == wanted)
            .await
            .ok_or_else(|| DomainError::not_found("VendorUser", external_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Passport;
    use crate::persistence::Collection;
    use crate::seedwork::{AggregateRoot, Repository};

    fn repo() -> InMemoryRepository<VendorUser> {
        InMemoryRepository::new(Collection::new("VendorUser"), Passport::system())
    }

    #[test]
    fn test_empty_last_name_is_a_validation_error() {
        let err = repo()
            .get_new_instance(&Uuid::new_v4().to_string(), "", None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_short_external_id_is_rejected() {
        let err = repo().get_new_instance("too-short", "Lovelace", None).unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_get_by_external_id() {
        let mut repo = repo();
        let external_id = Uuid::new_v4().to_string();
        let mut user = repo
            .get_new_instance(&external_id, "Lovelace", Some("Ada"))
            .unwrap();
        repo.save(&mut user).await.unwrap();

        let found = repo.get_by_external_id(&external_id).await.unwrap();
        assert_eq!(found.id(), user.id());
        assert!(repo
            .get_by_external_id(&Uuid::new_v4().to_string())
            .await
            .unwrap_err()
            .is_not_found());
    }
}
