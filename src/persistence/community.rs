use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::community::{Community, CommunityName, CommunityRepository};
use crate::seedwork::DomainError;
use super::repository::InMemoryRepository;

#[async_trait]
impl CommunityRepository for InMemoryRepository<Community> {
    fn get_new_instance(&self, name: &str, created_by: Uuid) -> Result<Community, DomainError> {
        let name = CommunityName::new(name)?;
        Community::create(Uuid::now_v7(), name, created_by, self.passport().clone())
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Community, DomainError> {
        let host = domain.trim().to_string();
        self.find_one(move |props| props.serves_host(&host))
            .await
            .ok_or_else(|| DomainError::not_found("Community", domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Passport;
    use crate::persistence::Collection;
    use crate::seedwork::{AggregateRoot, Repository, ValidationError};

    #[tokio::test]
    async fn test_get_new_instance_validates_name() {
        let creator = Uuid::new_v4();
        let repo = InMemoryRepository::<Community>::new(
            Collection::new("Community"),
            Passport::for_user(creator),
        );

        let err = repo.get_new_instance("  ", creator).unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::Empty { field: "name" }));

        let community = repo.get_new_instance("Oak Park", creator).unwrap();
        assert_eq!(community.created_by(), creator);
    }

    #[tokio::test]
    async fn test_get_by_domain_sees_staged_changes() {
        let creator = Uuid::new_v4();
        let mut repo = InMemoryRepository::<Community>::new(
            Collection::new("Community"),
            Passport::for_user(creator),
        );

        let mut community = repo.get_new_instance("Oak Park", creator).unwrap();
        community.set_white_label_domain(Some("brand.example.com")).unwrap();
        repo.save(&mut community).await.unwrap();

        let found = repo.get_by_domain(" BRAND.example.com").await.unwrap();
        assert_eq!(found.id(), community.id());
        assert!(repo.get_by_domain("other.example.com").await.unwrap_err().is_not_found());
    }
}
