use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::ExternalId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VendorUserCreated {
    pub user_id: Uuid,
    pub external_id: ExternalId,
}
