use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::PlatformEvent;
use crate::domain::passport::Passport;
use crate::domain::value_objects::Email;
use crate::seedwork::{AggregateCore, AggregateRoot, DomainError};
use super::events::VendorUserCreated;
use super::value_objects::{ExternalId, FirstName, LastName};

// ============================================================================
// Vendor User Aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUserProps {
    pub external_id: ExternalId,
    pub first_name: Option<FirstName>,
    pub last_name: LastName,
    pub email: Option<Email>,
    pub access_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw personal-information changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VendorUser {
    core: AggregateCore<VendorUserProps, PlatformEvent, Passport>,
}

impl VendorUser {
    /// Register a user already verified by the identity provider.
    pub fn create(
        id: Uuid,
        external_id: ExternalId,
        last_name: LastName,
        first_name: Option<FirstName>,
        passport: Passport,
    ) -> Self {
        let now = Utc::now();
        let props = VendorUserProps {
            external_id: external_id.clone(),
            first_name,
            last_name,
            email: None,
            access_blocked: false,
            created_at: now,
            updated_at: now,
        };

        let mut core = AggregateCore::new(id, props, passport);
        core.add_domain_event(
            VendorUserCreated {
                user_id: id,
                external_id,
            }
            .into(),
        );
        Self { core }
    }

    pub fn external_id(&self) -> &ExternalId {
        &self.core.props().external_id
    }

    pub fn first_name(&self) -> Option<&FirstName> {
        self.core.props().first_name.as_ref()
    }

    pub fn last_name(&self) -> &LastName {
        &self.core.props().last_name
    }

    pub fn email(&self) -> Option<&Email> {
        self.core.props().email.as_ref()
    }

    /// "First Last", or just the last name when no first name is set.
    pub fn display_name(&self) -> String {
        match self.first_name().filter(|f| !f.as_str().is_empty()) {
            Some(first) => format!("{} {}", first, self.last_name()),
            None => self.last_name().to_string(),
        }
    }

    pub fn is_access_blocked(&self) -> bool {
        self.core.props().access_blocked
    }

    fn ensure_is_self(&self, action: &str) -> Result<(), DomainError> {
        if self.core.is_new() || self.core.passport().acts_for(self.core.id()) {
            return Ok(());
        }
        Err(DomainError::permission_denied(format!(
            "{action} is only allowed for the user themselves"
        )))
    }

    /// Apply every change or none: all fields validate before any is written.
    pub fn update_personal_information(
        &mut self,
        changes: PersonalInformation,
    ) -> Result<(), DomainError> {
        self.ensure_is_self("update personal information")?;

        let first_name = changes.first_name.map(FirstName::new).transpose()?;
        let last_name = changes.last_name.map(LastName::new).transpose()?;
        let email = changes.email.map(Email::new).transpose()?;

        let props = self.core.props_mut();
        if let Some(first_name) = first_name {
            props.first_name = Some(first_name);
        }
        if let Some(last_name) = last_name {
            props.last_name = last_name;
        }
        if let Some(email) = email {
            props.email = Some(email);
        }
        props.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_access_blocked(&mut self, blocked: bool) -> Result<(), DomainError> {
        self.core.passport().ensure_system("change vendor user access")?;
        let props = self.core.props_mut();
        props.access_blocked = blocked;
        props.updated_at = Utc::now();
        Ok(())
    }
}

impl AggregateRoot for VendorUser {
    type Props = VendorUserProps;
    type Event = PlatformEvent;
    type Passport = Passport;

    const NAME: &'static str = "VendorUser";

    fn unique_keys(props: &VendorUserProps) -> Vec<String> {
        vec![format!("externalId:{}", props.external_id.as_str())]
    }

    fn from_core(core: AggregateCore<VendorUserProps, PlatformEvent, Passport>) -> Self {
        Self { core }
    }

    fn core(&self) -> &AggregateCore<VendorUserProps, PlatformEvent, Passport> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore<VendorUserProps, PlatformEvent, Passport> {
        &mut self.core
    }
}
