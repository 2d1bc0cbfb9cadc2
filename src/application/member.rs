use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::member::{Member, MemberRepository, ProfileUpdate, Role};
use crate::domain::Passport;
use crate::seedwork::{AggregateRoot, DomainError, Repository, UnitOfWork};
use super::data_sources::DataSources;

// ============================================================================
// Member Application Service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: Uuid,
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub member_name: String,
    pub role: Role,
    pub profile: ProfileView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        let props = member.props();
        Self {
            id: member.id(),
            community_id: props.community_id,
            user_id: props.user_id,
            member_name: props.member_name.to_string(),
            role: props.role,
            profile: ProfileView {
                name: props.profile.name.as_ref().map(ToString::to_string),
                email: props.profile.email.as_ref().map(ToString::to_string),
                bio: props.profile.bio.as_ref().map(ToString::to_string),
                interests: props.profile.interests.to_strings(),
            },
            created_at: props.created_at,
            updated_at: props.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct MemberApplicationService {
    data_sources: Arc<DataSources>,
}

impl MemberApplicationService {
    pub fn new(data_sources: Arc<DataSources>) -> Self {
        Self { data_sources }
    }

    /// Add `user_id` to an existing community. A user holds at most one
    /// membership per community.
    pub async fn create_member(
        &self,
        passport: &Passport,
        community_id: Uuid,
        user_id: Uuid,
        member_name: &str,
        role: Role,
    ) -> Result<MemberView, DomainError> {
        // The community must exist before anyone can join it.
        self.data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move { repo.get(community_id).await.map(|_| ()) })
            })
            .await?;

        let member_name = member_name.to_string();
        let view = self
            .data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    match repo.get_by_community_and_user(community_id, user_id).await {
                        Ok(existing) => {
                            return Err(DomainError::conflict(format!(
                                "user {} is already member {} of community {}",
                                user_id,
                                existing.id(),
                                community_id
                            )));
                        }
                        Err(e) if e.is_not_found() => {}
                        Err(e) => return Err(e),
                    }

                    let mut member =
                        repo.get_new_instance(community_id, user_id, &member_name, role)?;
                    repo.save(&mut member).await?;
                    Ok(MemberView::from(&member))
                })
            })
            .await?;

        tracing::info!(
            member_id = %view.id,
            community_id = %community_id,
            role = ?role,
            "Member created"
        );
        Ok(view)
    }

    pub async fn update_profile(
        &self,
        passport: &Passport,
        member_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<MemberView, DomainError> {
        self.data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut member = repo.get(member_id).await?;
                    let changed = member.update_profile(update)?;
                    if !changed.is_empty() {
                        repo.save(&mut member).await?;
                    }
                    Ok(MemberView::from(&member))
                })
            })
            .await
    }

    pub async fn rename_member(
        &self,
        passport: &Passport,
        member_id: Uuid,
        member_name: &str,
    ) -> Result<MemberView, DomainError> {
        let member_name = member_name.to_string();
        self.data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut member = repo.get(member_id).await?;
                    member.set_member_name(&member_name)?;
                    repo.save(&mut member).await?;
                    Ok(MemberView::from(&member))
                })
            })
            .await
    }

    /// Requires `ManageMembers` in the member's community.
    pub async fn change_role(
        &self,
        passport: &Passport,
        member_id: Uuid,
        role: Role,
    ) -> Result<MemberView, DomainError> {
        let view = self
            .data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut member = repo.get(member_id).await?;
                    member.set_role(role)?;
                    repo.save(&mut member).await?;
                    Ok(MemberView::from(&member))
                })
            })
            .await?;

        tracing::info!(member_id = %member_id, role = ?role, "Member role changed");
        Ok(view)
    }

    /// Members may leave on their own; removing someone else requires
    /// `ManageMembers`.
    pub async fn remove_member(&self, passport: &Passport, member_id: Uuid) -> Result<(), DomainError> {
        self.data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let member = repo.get(member_id).await?;
                    member.ensure_can_delete()?;
                    repo.delete(member_id).await
                })
            })
            .await?;

        tracing::info!(member_id = %member_id, "Member removed");
        Ok(())
    }

    pub async fn query_by_id(
        &self,
        passport: &Passport,
        member_id: Uuid,
    ) -> Result<MemberView, DomainError> {
        self.data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let member = repo.get(member_id).await?;
                    Ok(MemberView::from(&member))
                })
            })
            .await
    }

    pub async fn query_by_community(
        &self,
        passport: &Passport,
        community_id: Uuid,
    ) -> Result<Vec<MemberView>, DomainError> {
        self.data_sources
            .member
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let members = repo.list_by_community(community_id).await?;
                    Ok(members.iter().map(MemberView::from).collect())
                })
            })
            .await
    }
}
