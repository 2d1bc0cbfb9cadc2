use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberCreated {
    pub member_id: Uuid,
    pub community_id: Uuid,
    pub user_id: Uuid,
}

/// Raised once per profile update, listing the fields that actually changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberProfileUpdated {
    pub member_id: Uuid,
    pub community_id: Uuid,
    pub changed_fields: Vec<String>,
}
