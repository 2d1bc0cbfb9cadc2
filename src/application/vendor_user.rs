use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::vendor_user::{PersonalInformation, VendorUser, VendorUserRepository};
use crate::domain::Passport;
use crate::seedwork::{AggregateRoot, DomainError, Repository, UnitOfWork};
use super::data_sources::DataSources;

// ============================================================================
// Vendor User Application Service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUserView {
    pub id: Uuid,
    pub external_id: String,
    pub first_name: Option<String>,
    pub last_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub access_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&VendorUser> for VendorUserView {
    fn from(user: &VendorUser) -> Self {
        let props = user.props();
        Self {
            id: user.id(),
            external_id: props.external_id.to_string(),
            first_name: props.first_name.as_ref().map(ToString::to_string),
            last_name: props.last_name.to_string(),
            display_name: user.display_name(),
            email: props.email.as_ref().map(ToString::to_string),
            access_blocked: props.access_blocked,
            created_at: props.created_at,
        }
    }
}

#[derive(Clone)]
pub struct VendorUserApplicationService {
    data_sources: Arc<DataSources>,
}

impl VendorUserApplicationService {
    pub fn new(data_sources: Arc<DataSources>) -> Self {
        Self { data_sources }
    }

    /// Return the user known under `external_id`, registering it first if
    /// this is the first time the identity provider presents it.
    pub async fn create_if_not_exists(
        &self,
        passport: &Passport,
        external_id: &str,
        last_name: &str,
        first_name: Option<&str>,
    ) -> Result<VendorUserView, DomainError> {
        let external_id = external_id.to_string();
        let last_name = last_name.to_string();
        let first_name = first_name.map(str::to_string);

        self.data_sources
            .vendor_user
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    match repo.get_by_external_id(&external_id).await {
                        Ok(existing) => return Ok(VendorUserView::from(&existing)),
                        Err(e) if e.is_not_found() => {}
                        Err(e) => return Err(e),
                    }

                    let mut user =
                        repo.get_new_instance(&external_id, &last_name, first_name.as_deref())?;
                    repo.save(&mut user).await?;
                    tracing::info!(user_id = %user.id(), "Vendor user registered");
                    Ok(VendorUserView::from(&user))
                })
            })
            .await
    }

    pub async fn query_by_id(
        &self,
        passport: &Passport,
        user_id: Uuid,
    ) -> Result<VendorUserView, DomainError> {
        self.data_sources
            .vendor_user
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let user = repo.get(user_id).await?;
                    Ok(VendorUserView::from(&user))
                })
            })
            .await
    }

    pub async fn query_by_external_id(
        &self,
        passport: &Passport,
        external_id: &str,
    ) -> Result<VendorUserView, DomainError> {
        let external_id = external_id.to_string();
        self.data_sources
            .vendor_user
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let user = repo.get_by_external_id(&external_id).await?;
                    Ok(VendorUserView::from(&user))
                })
            })
            .await
    }

    pub async fn update_personal_information(
        &self,
        passport: &Passport,
        user_id: Uuid,
        changes: PersonalInformation,
    ) -> Result<VendorUserView, DomainError> {
        self.data_sources
            .vendor_user
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut user = repo.get(user_id).await?;
                    user.update_personal_information(changes)?;
                    repo.save(&mut user).await?;
                    Ok(VendorUserView::from(&user))
                })
            })
            .await
    }

    /// Blocked users are issued guest passports until unblocked.
    pub async fn set_access_blocked(
        &self,
        passport: &Passport,
        user_id: Uuid,
        blocked: bool,
    ) -> Result<VendorUserView, DomainError> {
        let view = self
            .data_sources
            .vendor_user
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut user = repo.get(user_id).await?;
                    user.set_access_blocked(blocked)?;
                    repo.save(&mut user).await?;
                    Ok(VendorUserView::from(&user))
                })
            })
            .await?;

        tracing::info!(user_id = %user_id, blocked, "Vendor user access changed");
        Ok(view)
    }
}
