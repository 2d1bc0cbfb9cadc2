// ============================================================================
// Resolver Modules - one per bounded context
// ============================================================================

mod community;
mod member;
mod vendor_user;

pub use community::CommunityModule;
pub use member::MemberModule;
pub use vendor_user::VendorUserModule;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::seedwork::{DomainError, ValidationError};
use super::context::GraphContext;

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, DomainError> {
    serde_json::from_value(args)
        .map_err(|e| ValidationError::invalid_format("arguments", e.to_string()).into())
}

fn to_value<T: Serialize>(view: T) -> Result<Value, DomainError> {
    serde_json::to_value(view).map_err(|e| DomainError::Persistence(e.to_string()))
}

fn current_user(ctx: &GraphContext) -> Result<Uuid, DomainError> {
    ctx.passport
        .user_id()
        .ok_or_else(|| DomainError::permission_denied("field requires a signed-in user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        community_id: Uuid,
    }

    #[test]
    fn test_bad_arguments_are_validation_errors() {
        let err = parse_args::<Args>(json!({ "communityId": "nope" })).unwrap_err();
        assert!(err.is_validation());

        let id = Uuid::new_v4();
        let ok: Args = parse_args(json!({ "communityId": id })).unwrap();
        assert_eq!(ok.community_id, id);
    }
}
