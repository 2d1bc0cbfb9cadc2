use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::member::{Member, MemberName, MemberRepository, Role};
use crate::seedwork::DomainError;
use super::repository::InMemoryRepository;

#[async_trait]
impl MemberRepository for InMemoryRepository<Member> {
    fn get_new_instance(
        &self,
        community_id: Uuid,
        user_id: Uuid,
        member_name: &str,
        role: Role,
    ) -> Result<Member, DomainError> {
        let member_name = MemberName::new(member_name)?;
        Member::create(
            Uuid::now_v7(),
            community_id,
            user_id,
            member_name,
            role,
            self.passport().clone(),
        )
    }

    async fn list_by_community(&self, community_id: Uuid) -> Result<Vec<Member>, DomainError> {
        Ok(self
            .find_all(move |props| props.community_id == community_id)
            .await)
    }

    async fn get_by_community_and_user(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> Result<Member, DomainError> {
        self.find_one(move |props| props.community_id == community_id && props.user_id == user_id)
            .await
            .ok_or_else(|| DomainError::not_found("Member", format!("{community_id}/{user_id}")))
    }
}
