use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::PlatformEvent;
use crate::domain::passport::{Passport, Permission};
use crate::seedwork::{AggregateCore, AggregateRoot, DomainError};
use super::events::{CommunityCreated, CommunityDomainUpdated, CommunityWhiteLabelDomainUpdated};
use super::value_objects::{CommunityName, Domain, Handle, WhiteLabelDomain};

// ============================================================================
// Community Aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityProps {
    pub name: CommunityName,
    pub domain: Option<Domain>,
    pub white_label_domain: Option<WhiteLabelDomain>,
    pub handle: Option<Handle>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommunityProps {
    /// Whether `host` is the primary or white-label domain, ignoring case.
    pub fn serves_host(&self, host: &str) -> bool {
        let host = host.trim();
        self.domain
            .as_ref()
            .is_some_and(|d| d.as_str().eq_ignore_ascii_case(host))
            || self
                .white_label_domain
                .as_ref()
                .is_some_and(|d| d.as_str().eq_ignore_ascii_case(host))
    }

    /// Lower-cased hosts this community answers on.
    pub fn hosts(&self) -> Vec<String> {
        let domain = self.domain.as_ref().map(|d| d.as_str());
        let white_label = self.white_label_domain.as_ref().map(|d| d.as_str());
        domain
            .into_iter()
            .chain(white_label)
            .map(str::to_ascii_lowercase)
            .collect()
    }
}

// Host names compare without regard to case.
fn same_host(current: Option<&str>, next: Option<&str>) -> bool {
    match (current, next) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct Community {
    core: AggregateCore<CommunityProps, PlatformEvent, Passport>,
}

impl Community {
    /// Create a transient community on behalf of `created_by`.
    ///
    /// Only the creator (or the system) may create a community in their name.
    pub fn create(
        id: Uuid,
        name: CommunityName,
        created_by: Uuid,
        passport: Passport,
    ) -> Result<Self, DomainError> {
        passport.ensure_authenticated("create community")?;
        if !passport.acts_for(created_by) {
            return Err(DomainError::permission_denied(
                "a community can only be created on behalf of the acting user",
            ));
        }

        let now = Utc::now();
        let props = CommunityProps {
            name,
            domain: None,
            white_label_domain: None,
            handle: None,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let mut core = AggregateCore::new(id, props, passport);
        core.add_domain_event(
            CommunityCreated {
                community_id: id,
                created_by,
            }
            .into(),
        );
        Ok(Self { core })
    }

    pub fn name(&self) -> &CommunityName {
        &self.core.props().name
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.core.props().domain.as_ref()
    }

    pub fn white_label_domain(&self) -> Option<&WhiteLabelDomain> {
        self.core.props().white_label_domain.as_ref()
    }

    pub fn handle(&self) -> Option<&Handle> {
        self.core.props().handle.as_ref()
    }

    pub fn created_by(&self) -> Uuid {
        self.core.props().created_by
    }

    pub fn serves_host(&self, host: &str) -> bool {
        self.core.props().serves_host(host)
    }

    // A transient community is configured by its creator before first save.
    fn ensure_can_manage_settings(&self, action: &str) -> Result<(), DomainError> {
        if self.core.is_new() {
            return Ok(());
        }
        self.core
            .passport()
            .ensure(self.core.id(), Permission::ManageCommunitySettings, action)
    }

    fn touch(&mut self) {
        self.core.props_mut().updated_at = Utc::now();
    }

    pub fn set_name(&mut self, raw: &str) -> Result<(), DomainError> {
        self.ensure_can_manage_settings("rename community")?;
        let name = CommunityName::new(raw)?;
        if self.core.props().name != name {
            self.core.props_mut().name = name;
            self.touch();
        }
        Ok(())
    }

    pub fn set_domain(&mut self, raw: &str) -> Result<(), DomainError> {
        self.ensure_can_manage_settings("update community domain")?;
        let domain = Domain::new(raw)?;
        if same_host(self.domain().map(Domain::as_str), Some(domain.as_str())) {
            return Ok(());
        }

        let old_domain = self.core.props_mut().domain.replace(domain.clone());
        self.touch();
        let community_id = self.core.id();
        self.core.add_domain_event(
            CommunityDomainUpdated {
                community_id,
                domain,
                old_domain,
            }
            .into(),
        );
        Ok(())
    }

    /// Set or clear (`None`) the white-label domain.
    pub fn set_white_label_domain(&mut self, raw: Option<&str>) -> Result<(), DomainError> {
        self.ensure_can_manage_settings("update white-label domain")?;
        let white_label_domain = raw.map(WhiteLabelDomain::new).transpose()?;
        if same_host(
            self.white_label_domain().map(WhiteLabelDomain::as_str),
            white_label_domain.as_ref().map(WhiteLabelDomain::as_str),
        ) {
            return Ok(());
        }

        let old_white_label_domain = std::mem::replace(
            &mut self.core.props_mut().white_label_domain,
            white_label_domain.clone(),
        );
        self.touch();
        let community_id = self.core.id();
        self.core.add_domain_event(
            CommunityWhiteLabelDomainUpdated {
                community_id,
                white_label_domain,
                old_white_label_domain,
            }
            .into(),
        );
        Ok(())
    }

    pub fn set_handle(&mut self, raw: &str) -> Result<(), DomainError> {
        self.ensure_can_manage_settings("update community handle")?;
        let handle = Handle::new(raw)?;
        self.core.props_mut().handle = Some(handle);
        self.touch();
        Ok(())
    }

    pub fn ensure_can_delete(&self) -> Result<(), DomainError> {
        self.core.passport().ensure(
            self.core.id(),
            Permission::ManageCommunitySettings,
            "delete community",
        )
    }
}

impl AggregateRoot for Community {
    type Props = CommunityProps;
    type Event = PlatformEvent;
    type Passport = Passport;

    const NAME: &'static str = "Community";

    // Primary and white-label domains share one host namespace.
    fn unique_keys(props: &CommunityProps) -> Vec<String> {
        props.hosts().into_iter().map(|host| format!("host:{host}")).collect()
    }

    fn from_core(core: AggregateCore<CommunityProps, PlatformEvent, Passport>) -> Self {
        Self { core }
    }

    fn core(&self) -> &AggregateCore<CommunityProps, PlatformEvent, Passport> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore<CommunityProps, PlatformEvent, Passport> {
        &mut self.core
    }
}

// ============================================================================
// Tests
// ============================================================================
