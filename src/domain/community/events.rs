use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Domain, WhiteLabelDomain};

// ============================================================================
// Community Domain Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityCreated {
    pub community_id: Uuid,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityDomainUpdated {
    pub community_id: Uuid,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_domain: Option<Domain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityWhiteLabelDomainUpdated {
    pub community_id: Uuid,
    pub white_label_domain: Option<WhiteLabelDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_white_label_domain: Option<WhiteLabelDomain>,
}
