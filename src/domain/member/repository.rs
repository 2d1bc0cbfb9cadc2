use async_trait::async_trait;
use uuid::Uuid;

use crate::seedwork::{DomainError, Repository};
use super::aggregate::Member;
use super::value_objects::Role;

#[async_trait]
pub trait MemberRepository: Repository<Member> {
    fn get_new_instance(
        &self,
        community_id: Uuid,
        user_id: Uuid,
        member_name: &str,
        role: Role,
    ) -> Result<Member, DomainError>;

    /// Members of a community, oldest first.
    async fn list_by_community(&self, community_id: Uuid) -> Result<Vec<Member>, DomainError>;

    async fn get_by_community_and_user(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> Result<Member, DomainError>;
}
