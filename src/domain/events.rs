use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seedwork::DomainEvent;
use super::community::{CommunityCreated, CommunityDomainUpdated, CommunityWhiteLabelDomainUpdated};
use super::member::{MemberCreated, MemberProfileUpdated};
use super::vendor_user::VendorUserCreated;

// ============================================================================
// Platform Events - Closed Union of Every Domain Event
// ============================================================================
//
// Serialized as { "type": <tag>, "payload": { ... } }. The tag is the
// variant name and is what handlers register against.
//
// ============================================================================

/// Event type tags, shared by aggregates, handler registrations and metrics.
pub mod event_types {
    pub const COMMUNITY_CREATED: &str = "CommunityCreated";
    pub const COMMUNITY_DOMAIN_UPDATED: &str = "CommunityDomainUpdated";
    pub const COMMUNITY_WHITE_LABEL_DOMAIN_UPDATED: &str = "CommunityWhiteLabelDomainUpdated";
    pub const VENDOR_USER_CREATED: &str = "VendorUserCreated";
    pub const MEMBER_CREATED: &str = "MemberCreated";
    pub const MEMBER_PROFILE_UPDATED: &str = "MemberProfileUpdated";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PlatformEvent {
    CommunityCreated(CommunityCreated),
    CommunityDomainUpdated(CommunityDomainUpdated),
    CommunityWhiteLabelDomainUpdated(CommunityWhiteLabelDomainUpdated),
    VendorUserCreated(VendorUserCreated),
    MemberCreated(MemberCreated),
    MemberProfileUpdated(MemberProfileUpdated),
}

impl DomainEvent for PlatformEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PlatformEvent::CommunityCreated(_) => event_types::COMMUNITY_CREATED,
            PlatformEvent::CommunityDomainUpdated(_) => event_types::COMMUNITY_DOMAIN_UPDATED,
            PlatformEvent::CommunityWhiteLabelDomainUpdated(_) => {
                event_types::COMMUNITY_WHITE_LABEL_DOMAIN_UPDATED
            }
            PlatformEvent::VendorUserCreated(_) => event_types::VENDOR_USER_CREATED,
            PlatformEvent::MemberCreated(_) => event_types::MEMBER_CREATED,
            PlatformEvent::MemberProfileUpdated(_) => event_types::MEMBER_PROFILE_UPDATED,
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            PlatformEvent::CommunityCreated(e) => e.community_id,
            PlatformEvent::CommunityDomainUpdated(e) => e.community_id,
            PlatformEvent::CommunityWhiteLabelDomainUpdated(e) => e.community_id,
            PlatformEvent::VendorUserCreated(e) => e.user_id,
            PlatformEvent::MemberCreated(e) => e.member_id,
            PlatformEvent::MemberProfileUpdated(e) => e.member_id,
        }
    }
}

macro_rules! impl_from_payload {
    ($($payload:ident),* $(,)?) => {
        $(
            impl From<$payload> for PlatformEvent {
                fn from(payload: $payload) -> Self {
                    PlatformEvent::$payload(payload)
                }
            }
        )*
    };
}

impl_from_payload!(
    CommunityCreated,
    CommunityDomainUpdated,
    CommunityWhiteLabelDomainUpdated,
    VendorUserCreated,
    MemberCreated,
    MemberProfileUpdated,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::community::Domain;
    use crate::seedwork::{deserialize_event, serialize_event};

    #[test]
    fn test_payload_is_returned_unchanged() {
        let payload = CommunityDomainUpdated {
            community_id: Uuid::new_v4(),
            domain: Domain::new("new.example.com").unwrap(),
            old_domain: Some(Domain::new("old.example.com").unwrap()),
        };
        let event = PlatformEvent::from(payload.clone());

        match &event {
            PlatformEvent::CommunityDomainUpdated(inner) => assert_eq!(inner, &payload),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(event.event_type(), "CommunityDomainUpdated");
        assert_eq!(event.aggregate_id(), payload.community_id);
    }

    #[test]
    fn test_wire_shape_matches_declared_payload() {
        let community_id = Uuid::new_v4();
        let event = PlatformEvent::from(CommunityDomainUpdated {
            community_id,
            domain: Domain::new("oak.example.com").unwrap(),
            old_domain: None,
        });

        let json: serde_json::Value = serde_json::from_str(&serialize_event(&event).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "CommunityDomainUpdated",
                "payload": {
                    "communityId": community_id.to_string(),
                    "domain": "oak.example.com"
                }
            })
        );
    }

    #[test]
    fn test_round_trip_through_wire() {
        let event = PlatformEvent::from(CommunityCreated {
            community_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
        });
        let json = serialize_event(&event).unwrap();
        let back: PlatformEvent = deserialize_event(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.event_type(), event_types::COMMUNITY_CREATED);
    }

    #[test]
    fn test_invalid_value_in_payload_is_rejected() {
        let json = format!(
            r#"{{"type":"CommunityDomainUpdated","payload":{{"communityId":"{}","domain":"not a host"}}}}"#,
            Uuid::new_v4()
        );
        assert!(deserialize_event::<PlatformEvent>(&json).is_err());
    }
}
