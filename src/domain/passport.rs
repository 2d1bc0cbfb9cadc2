use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::seedwork::DomainError;

// ============================================================================
// Passport - Capability Token
// ============================================================================
//
// Threaded through repositories and units of work. The data layer consults
// it before mutating an aggregate; it never mutates it. Which permissions a
// principal holds is decided by whoever issues the passport.
//
// ============================================================================

/// Who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Internal processes: startup wiring, integration-event handlers.
    System,
    /// An authenticated vendor user.
    User(Uuid),
    /// An unauthenticated caller.
    Guest,
}

/// Community-scoped permissions granted to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageCommunitySettings,
    ManageMembers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passport {
    principal: Principal,
    community_permissions: HashMap<Uuid, HashSet<Permission>>,
}

impl Passport {
    pub fn system() -> Self {
        Self {
            principal: Principal::System,
            community_permissions: HashMap::new(),
        }
    }

    pub fn guest() -> Self {
        Self {
            principal: Principal::Guest,
            community_permissions: HashMap::new(),
        }
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            principal: Principal::User(user_id),
            community_permissions: HashMap::new(),
        }
    }

    pub fn with_community_permissions(
        mut self,
        community_id: Uuid,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        self.community_permissions
            .entry(community_id)
            .or_default()
            .extend(permissions);
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self.principal {
            Principal::User(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.principal == Principal::System
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal != Principal::Guest
    }

    /// System passports hold every permission in every community.
    pub fn can(&self, community_id: Uuid, permission: Permission) -> bool {
        self.is_system()
            || self
                .community_permissions
                .get(&community_id)
                .is_some_and(|granted| granted.contains(&permission))
    }

    /// Whether the passport acts for `user_id` (or is the system).
    pub fn acts_for(&self, user_id: Uuid) -> bool {
        self.is_system() || self.user_id() == Some(user_id)
    }

    pub fn ensure(
        &self,
        community_id: Uuid,
        permission: Permission,
        action: &str,
    ) -> Result<(), DomainError> {
        if self.can(community_id, permission) {
            return Ok(());
        }
        Err(DomainError::permission_denied(format!(
            "{action} requires {permission:?} in community {community_id}"
        )))
    }

    pub fn ensure_authenticated(&self, action: &str) -> Result<(), DomainError> {
        if self.is_authenticated() {
            return Ok(());
        }
        Err(DomainError::permission_denied(format!(
            "{action} requires an authenticated principal"
        )))
    }

    pub fn ensure_system(&self, action: &str) -> Result<(), DomainError> {
        if self.is_system() {
            return Ok(());
        }
        Err(DomainError::permission_denied(format!(
            "{action} is restricted to the system principal"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_passport_can_everything() {
        let passport = Passport::system();
        assert!(passport.can(Uuid::new_v4(), Permission::ManageMembers));
        assert!(passport.acts_for(Uuid::new_v4()));
        assert!(passport.ensure_system("seed").is_ok());
    }

    #[test]
    fn test_user_permissions_are_community_scoped() {
        let community = Uuid::new_v4();
        let other = Uuid::new_v4();
        let passport = Passport::for_user(Uuid::new_v4())
            .with_community_permissions(community, [Permission::ManageCommunitySettings]);

        assert!(passport.can(community, Permission::ManageCommunitySettings));
        assert!(!passport.can(community, Permission::ManageMembers));
        assert!(!passport.can(other, Permission::ManageCommunitySettings));

        let err = passport
            .ensure(other, Permission::ManageCommunitySettings, "update domain")
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[test]
    fn test_guest_is_not_authenticated() {
        let passport = Passport::guest();
        assert!(!passport.is_authenticated());
        assert!(passport.user_id().is_none());
        assert!(passport.ensure_authenticated("create community").is_err());
    }

    #[test]
    fn test_acts_for_only_own_user() {
        let me = Uuid::new_v4();
        let passport = Passport::for_user(me);
        assert!(passport.acts_for(me));
        assert!(!passport.acts_for(Uuid::new_v4()));
    }
}
