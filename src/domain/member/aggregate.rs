use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::PlatformEvent;
use crate::domain::passport::{Passport, Permission};
use crate::domain::value_objects::Email;
use crate::seedwork::{AggregateCore, AggregateRoot, DomainError};
use super::events::{MemberCreated, MemberProfileUpdated};
use super::value_objects::{Bio, Interests, MemberName, Name, Role};

// ============================================================================
// Member Aggregate
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: Option<Name>,
    pub email: Option<Email>,
    pub bio: Option<Bio>,
    #[serde(default)]
    pub interests: Interests,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProps {
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub member_name: MemberName,
    pub role: Role,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Member {
    core: AggregateCore<MemberProps, PlatformEvent, Passport>,
}

impl Member {
    /// Admins (and the system) add anyone with any role; a user may only
    /// join as a plain member on their own behalf.
    pub fn create(
        id: Uuid,
        community_id: Uuid,
        user_id: Uuid,
        member_name: MemberName,
        role: Role,
        passport: Passport,
    ) -> Result<Self, DomainError> {
        let joins_self = passport.acts_for(user_id) && role == Role::Member;
        if !joins_self {
            passport.ensure(community_id, Permission::ManageMembers, "add member")?;
        }

        let now = Utc::now();
        let props = MemberProps {
            community_id,
            user_id,
            member_name,
            role,
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        };

        let mut core = AggregateCore::new(id, props, passport);
        core.add_domain_event(
            MemberCreated {
                member_id: id,
                community_id,
                user_id,
            }
            .into(),
        );
        Ok(Self { core })
    }

    pub fn community_id(&self) -> Uuid {
        self.core.props().community_id
    }

    pub fn user_id(&self) -> Uuid {
        self.core.props().user_id
    }

    pub fn member_name(&self) -> &MemberName {
        &self.core.props().member_name
    }

    pub fn role(&self) -> Role {
        self.core.props().role
    }

    pub fn profile(&self) -> &Profile {
        &self.core.props().profile
    }

    fn ensure_can_edit(&self, action: &str) -> Result<(), DomainError> {
        let passport = self.core.passport();
        if self.core.is_new() || passport.acts_for(self.user_id()) {
            return Ok(());
        }
        passport.ensure(self.community_id(), Permission::ManageMembers, action)
    }

    fn touch(&mut self) {
        self.core.props_mut().updated_at = Utc::now();
    }

    pub fn set_member_name(&mut self, raw: &str) -> Result<(), DomainError> {
        self.ensure_can_edit("rename member")?;
        let member_name = MemberName::new(raw)?;
        if self.core.props().member_name != member_name {
            self.core.props_mut().member_name = member_name;
            self.touch();
        }
        Ok(())
    }

    pub fn set_role(&mut self, role: Role) -> Result<(), DomainError> {
        self.core
            .passport()
            .ensure(self.community_id(), Permission::ManageMembers, "change member role")?;
        if self.core.props().role != role {
            self.core.props_mut().role = role;
            self.touch();
        }
        Ok(())
    }

    /// Validate every supplied field, then apply them together and raise a
    /// single `MemberProfileUpdated` naming the fields whose value changed.
    ///
    /// Returns the changed field names (empty when nothing changed).
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<Vec<String>, DomainError> {
        self.ensure_can_edit("update member profile")?;

        let name = update.name.map(Name::new).transpose()?;
        let email = update.email.map(Email::new).transpose()?;
        let bio = update.bio.map(Bio::new).transpose()?;
        let interests = update.interests.map(Interests::new).transpose()?;

        let profile = &mut self.core.props_mut().profile;
        let mut changed_fields = Vec::new();

        if let Some(name) = name.filter(|n| profile.name.as_ref() != Some(n)) {
            profile.name = Some(name);
            changed_fields.push("name".to_string());
        }
        if let Some(email) = email.filter(|e| profile.email.as_ref() != Some(e)) {
            profile.email = Some(email);
            changed_fields.push("email".to_string());
        }
        if let Some(bio) = bio.filter(|b| profile.bio.as_ref() != Some(b)) {
            profile.bio = Some(bio);
            changed_fields.push("bio".to_string());
        }
        if let Some(interests) = interests.filter(|i| &profile.interests != i) {
            profile.interests = interests;
            changed_fields.push("interests".to_string());
        }

        if changed_fields.is_empty() {
            return Ok(changed_fields);
        }

        self.touch();
        let member_id = self.core.id();
        let community_id = self.community_id();
        self.core.add_domain_event(
            MemberProfileUpdated {
                member_id,
                community_id,
                changed_fields: changed_fields.clone(),
            }
            .into(),
        );
        Ok(changed_fields)
    }

    pub fn ensure_can_delete(&self) -> Result<(), DomainError> {
        self.ensure_can_edit("remove member")
    }
}

impl AggregateRoot for Member {
    type Props = MemberProps;
    type Event = PlatformEvent;
    type Passport = Passport;

    const NAME: &'static str = "Member";

    fn unique_keys(props: &MemberProps) -> Vec<String> {
        vec![format!("membership:{}:{}", props.community_id, props.user_id)]
    }

    fn from_core(core: AggregateCore<MemberProps, PlatformEvent, Passport>) -> Self {
        Self { core }
    }

    fn core(&self) -> &AggregateCore<MemberProps, PlatformEvent, Passport> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore<MemberProps, PlatformEvent, Passport> {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seedwork::ValidationError;

    fn stored_member(user_id: Uuid, passport: Passport) -> Member {
        let community_id = Uuid::new_v4();
        let fresh = Member::create(
            Uuid::new_v4(),
            community_id,
            user_id,
            MemberName::new("ada").unwrap(),
            Role::Member,
            Passport::system(),
        )
        .unwrap();
        Member::from_core(AggregateCore::rehydrate(
            fresh.id(),
            1,
            fresh.props().clone(),
            passport,
        ))
    }

    #[test]
    fn test_user_can_join_as_member_but_not_as_admin() {
        let user = Uuid::new_v4();
        let community = Uuid::new_v4();
        let name = MemberName::new("ada").unwrap();

        let mut member = Member::create(
            Uuid::new_v4(),
            community,
            user,
            name.clone(),
            Role::Member,
            Passport::for_user(user),
        )
        .unwrap();
        let events = member.take_domain_events();
        assert!(matches!(&events[..], [PlatformEvent::MemberCreated(e)] if e.user_id == user));

        let as_admin = Member::create(
            Uuid::new_v4(),
            community,
            user,
            name,
            Role::Admin,
            Passport::for_user(user),
        );
        assert!(matches!(as_admin, Err(DomainError::PermissionDenied(_))));
    }

    #[test]
    fn test_update_profile_reports_changed_fields_once() {
        let user = Uuid::new_v4();
        let mut member = stored_member(user, Passport::for_user(user));

        let changed = member
            .update_profile(ProfileUpdate {
                name: Some("Ada Lovelace".into()),
                bio: Some("Analyst".into()),
                interests: Some(vec!["engines".into(), "poetry".into()]),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(changed, vec!["name", "bio", "interests"]);

        let events = member.take_domain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PlatformEvent::MemberProfileUpdated(e) => {
                assert_eq!(e.member_id, member.id());
                assert_eq!(e.changed_fields, changed);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unchanged_profile_raises_nothing() {
        let user = Uuid::new_v4();
        let mut member = stored_member(user, Passport::for_user(user));
        member
            .update_profile(ProfileUpdate {
                name: Some("Ada".into()),
                ..Default::default()
            })
            .unwrap();
        member.take_domain_events();

        let changed = member
            .update_profile(ProfileUpdate {
                name: Some(" Ada ".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(changed.is_empty());
        assert!(member.take_domain_events().is_empty());
    }

    #[test]
    fn test_invalid_bio_leaves_profile_untouched() {
        let user = Uuid::new_v4();
        let mut member = stored_member(user, Passport::for_user(user));

        let err = member
            .update_profile(ProfileUpdate {
                name: Some("Ada".into()),
                bio: Some("b".repeat(2001)),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::TooLong { field: "bio", max: 2000, .. })
        ));
        assert!(member.profile().name.is_none());
        assert!(member.take_domain_events().is_empty());
    }

    #[test]
    fn test_stranger_cannot_edit_profile_but_manager_can() {
        let user = Uuid::new_v4();
        let mut member = stored_member(user, Passport::for_user(Uuid::new_v4()));
        assert!(matches!(
            member.update_profile(ProfileUpdate::default()),
            Err(DomainError::PermissionDenied(_))
        ));

        let manager = Passport::for_user(Uuid::new_v4())
            .with_community_permissions(member.community_id(), [Permission::ManageMembers]);
        let mut member = Member::from_core(AggregateCore::rehydrate(
            member.id(),
            member.version(),
            member.props().clone(),
            manager,
        ));
        member.set_role(Role::Admin).unwrap();
        assert_eq!(member.role(), Role::Admin);
    }

    #[test]
    fn test_member_cannot_promote_self() {
        let user = Uuid::new_v4();
        let mut member = stored_member(user, Passport::for_user(user));
        assert!(member.set_role(Role::Admin).is_err());
        member.set_member_name("countess").unwrap();
        assert_eq!(member.member_name().as_str(), "countess");
    }
}
