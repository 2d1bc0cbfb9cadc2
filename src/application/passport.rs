use std::sync::Arc;
use uuid::Uuid;

use crate::domain::member::Role;
use crate::domain::vendor_user::VendorUserRepository;
use crate::domain::{Passport, Permission};
use crate::seedwork::{AggregateRoot, DomainError, UnitOfWork};
use super::data_sources::DataSources;

/// Permissions a role grants inside its community.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &[Permission::ManageCommunitySettings, Permission::ManageMembers],
        Role::Member => &[],
    }
}

/// Issues passports for already-authenticated principals, granting
/// community permissions from their memberships.
#[derive(Clone)]
pub struct PassportService {
    data_sources: Arc<DataSources>,
}

impl PassportService {
    pub fn new(data_sources: Arc<DataSources>) -> Self {
        Self { data_sources }
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<Passport, DomainError> {
        let memberships = self
            .data_sources
            .member
            .with_transaction(&Passport::system(), move |repo| {
                Box::pin(async move {
                    let members = repo.find_all(move |props| props.user_id == user_id).await;
                    Ok(members
                        .iter()
                        .map(|m| (m.props().community_id, m.props().role))
                        .collect::<Vec<_>>())
                })
            })
            .await?;

        let passport = memberships
            .into_iter()
            .fold(Passport::for_user(user_id), |passport, (community_id, role)| {
                passport.with_community_permissions(community_id, permissions_for(role).iter().copied())
            });

        tracing::debug!(user_id = %user_id, "Issued user passport");
        Ok(passport)
    }

    /// Passport for the identity-provider subject `external_id`. Unknown
    /// and blocked subjects get a guest passport.
    pub async fn for_external_id(&self, external_id: &str) -> Result<Passport, DomainError> {
        let external_id = external_id.to_string();
        let user_id = self
            .data_sources
            .vendor_user
            .with_transaction(&Passport::system(), move |repo| {
                Box::pin(async move {
                    match repo.get_by_external_id(&external_id).await {
                        Ok(user) if user.is_access_blocked() => Ok(None),
                        Ok(user) => Ok(Some(user.id())),
                        Err(e) if e.is_not_found() => Ok(None),
                        Err(e) => Err(e),
                    }
                })
            })
            .await?;

        match user_id {
            Some(user_id) => self.for_user(user_id).await,
            None => Ok(Passport::guest()),
        }
    }
}
