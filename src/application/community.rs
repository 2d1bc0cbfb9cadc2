use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::community::{Community, CommunityRepository};
use crate::domain::Passport;
use crate::seedwork::{AggregateRoot, DomainError, Repository, UnitOfWork};
use super::data_sources::DataSources;

// ============================================================================
// Community Application Service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
    pub id: Uuid,
    pub name: String,
    pub domain: Option<String>,
    pub white_label_domain: Option<String>,
    pub handle: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Community> for CommunityView {
    fn from(community: &Community) -> Self {
        let props = community.props();
        Self {
            id: community.id(),
            name: props.name.to_string(),
            domain: props.domain.as_ref().map(ToString::to_string),
            white_label_domain: props.white_label_domain.as_ref().map(ToString::to_string),
            handle: props.handle.as_ref().map(ToString::to_string),
            created_by: props.created_by,
            created_at: props.created_at,
            updated_at: props.updated_at,
        }
    }
}

/// Settings to change. `None` leaves a setting untouched; a blank
/// `white_label_domain` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySettingsUpdate {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub white_label_domain: Option<String>,
    pub handle: Option<String>,
}

// Two communities may not share a host name.
async fn ensure_host_available<R: CommunityRepository>(
    repo: &R,
    community_id: Uuid,
    host: &str,
) -> Result<(), DomainError> {
    match repo.get_by_domain(host).await {
        Ok(other) if other.id() != community_id => Err(DomainError::conflict(format!(
            "domain {} is already used by community {}",
            host.trim(),
            other.id()
        ))),
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

#[derive(Clone)]
pub struct CommunityApplicationService {
    data_sources: Arc<DataSources>,
}

impl CommunityApplicationService {
    pub fn new(data_sources: Arc<DataSources>) -> Self {
        Self { data_sources }
    }

    pub async fn create_community(
        &self,
        passport: &Passport,
        name: &str,
        created_by: Uuid,
    ) -> Result<CommunityView, DomainError> {
        let name = name.to_string();
        let view = self
            .data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut community = repo.get_new_instance(&name, created_by)?;
                    repo.save(&mut community).await?;
                    Ok(CommunityView::from(&community))
                })
            })
            .await?;

        tracing::info!(community_id = %view.id, created_by = %created_by, "Community created");
        Ok(view)
    }

    pub async fn update_settings(
        &self,
        passport: &Passport,
        community_id: Uuid,
        update: CommunitySettingsUpdate,
    ) -> Result<CommunityView, DomainError> {
        self.data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let mut community = repo.get(community_id).await?;

                    if let Some(name) = update.name.as_deref() {
                        community.set_name(name)?;
                    }
                    if let Some(domain) = update.domain.as_deref() {
                        ensure_host_available(&*repo, community_id, domain).await?;
                        community.set_domain(domain)?;
                    }
                    if let Some(white_label) = update.white_label_domain.as_deref() {
                        if white_label.trim().is_empty() {
                            community.set_white_label_domain(None)?;
                        } else {
                            ensure_host_available(&*repo, community_id, white_label).await?;
                            community.set_white_label_domain(Some(white_label))?;
                        }
                    }
                    if let Some(handle) = update.handle.as_deref() {
                        community.set_handle(handle)?;
                    }

                    repo.save(&mut community).await?;
                    Ok(CommunityView::from(&community))
                })
            })
            .await
    }

    pub async fn query_by_id(
        &self,
        passport: &Passport,
        community_id: Uuid,
    ) -> Result<CommunityView, DomainError> {
        self.data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let community = repo.get(community_id).await?;
                    Ok(CommunityView::from(&community))
                })
            })
            .await
    }

    pub async fn query_by_domain(
        &self,
        passport: &Passport,
        domain: &str,
    ) -> Result<CommunityView, DomainError> {
        let domain = domain.to_string();
        self.data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let community = repo.get_by_domain(&domain).await?;
                    Ok(CommunityView::from(&community))
                })
            })
            .await
    }

    pub async fn delete_community(
        &self,
        passport: &Passport,
        community_id: Uuid,
    ) -> Result<(), DomainError> {
        self.data_sources
            .community
            .with_transaction(passport, move |repo| {
                Box::pin(async move {
                    let community = repo.get(community_id).await?;
                    community.ensure_can_delete()?;
                    repo.delete(community_id).await
                })
            })
            .await?;

        tracing::info!(community_id = %community_id, "Community deleted");
        Ok(())
    }
}
