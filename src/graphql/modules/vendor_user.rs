use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::vendor_user::PersonalInformation;
use crate::graphql::schema::{resolver, FieldKey, PermissionRule, ResolverFn, ResolverModule};
use super::{current_user, parse_args, to_value};

const TYPE_DEFS: &str = r#"
type VendorUser {
  id: UUID!
  externalId: String!
  firstName: String
  lastName: String!
  displayName: String!
  email: String
  accessBlocked: Boolean!
  createdAt: DateTime!
}

input PersonalInformationInput {
  firstName: String
  lastName: String
  email: String
}

extend type Query {
  currentUser: VendorUser
  vendorUser(id: UUID!): VendorUser
}

extend type Mutation {
  vendorUserCreateIfNotExists(externalId: String!, lastName: String!, firstName: String): VendorUser!
  vendorUserPersonalInformationUpdate(input: PersonalInformationInput!): VendorUser!
}
"#;

#[derive(Deserialize)]
struct ById {
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIfNotExists {
    external_id: String,
    last_name: String,
    first_name: Option<String>,
}

#[derive(Deserialize)]
struct PersonalInformationUpdate {
    input: PersonalInformation,
}

pub struct VendorUserModule;

impl ResolverModule for VendorUserModule {
    fn name(&self) -> &'static str {
        "vendor_user"
    }

    fn type_defs(&self) -> &'static str {
        TYPE_DEFS
    }

    fn resolvers(&self) -> Vec<(FieldKey, ResolverFn)> {
        vec![
            (
                FieldKey::query("currentUser"),
                resolver(|ctx, _args| async move {
                    let Some(user_id) = ctx.passport.user_id() else {
                        return Ok(Value::Null);
                    };
                    let view = ctx.services.vendor_user.query_by_id(&ctx.passport, user_id).await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::query("vendorUser"),
                resolver(|ctx, args| async move {
                    let ById { id } = parse_args(args)?;
                    match ctx.services.vendor_user.query_by_id(&ctx.passport, id).await {
                        Ok(view) => to_value(view),
                        Err(e) if e.is_not_found() => Ok(Value::Null),
                        Err(e) => Err(e),
                    }
                }),
            ),
            (
                FieldKey::mutation("vendorUserCreateIfNotExists"),
                resolver(|ctx, args| async move {
                    let CreateIfNotExists {
                        external_id,
                        last_name,
                        first_name,
                    } = parse_args(args)?;
                    let view = ctx
                        .services
                        .vendor_user
                        .create_if_not_exists(
                            &ctx.passport,
                            &external_id,
                            &last_name,
                            first_name.as_deref(),
                        )
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("vendorUserPersonalInformationUpdate"),
                resolver(|ctx, args| async move {
                    let PersonalInformationUpdate { input } = parse_args(args)?;
                    let user_id = current_user(&ctx)?;
                    let view = ctx
                        .services
                        .vendor_user
                        .update_personal_information(&ctx.passport, user_id, input)
                        .await?;
                    to_value(view)
                }),
            ),
        ]
    }

    // Identity-provider sync runs as the system principal.
    fn permissions(&self) -> Vec<(FieldKey, PermissionRule)> {
        vec![
            (FieldKey::query("currentUser"), PermissionRule::Authenticated),
            (FieldKey::query("vendorUser"), PermissionRule::Authenticated),
            (
                FieldKey::mutation("vendorUserCreateIfNotExists"),
                PermissionRule::System,
            ),
            (
                FieldKey::mutation("vendorUserPersonalInformationUpdate"),
                PermissionRule::Authenticated,
            ),
        ]
    }
}
