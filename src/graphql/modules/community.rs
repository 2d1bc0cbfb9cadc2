use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::application::CommunitySettingsUpdate;
use crate::domain::Permission;
use crate::seedwork::DomainError;
use crate::graphql::schema::{resolver, FieldKey, PermissionRule, ResolverFn, ResolverModule};
use super::{current_user, parse_args, to_value};

const TYPE_DEFS: &str = r#"
type Community {
  id: UUID!
  name: String!
  domain: String
  whiteLabelDomain: String
  handle: String
  createdBy: UUID!
  createdAt: DateTime!
  updatedAt: DateTime!
}

input CommunitySettingsInput {
  name: String
  domain: String
  whiteLabelDomain: String
  handle: String
}

extend type Query {
  community(id: UUID!): Community
  communityByDomain(domain: String!): Community
}

extend type Mutation {
  communityCreate(name: String!): Community!
  communitySettingsUpdate(communityId: UUID!, input: CommunitySettingsInput!): Community!
  communityDelete(communityId: UUID!): Boolean!
}
"#;

#[derive(Deserialize)]
struct ById {
    id: Uuid,
}

#[derive(Deserialize)]
struct ByDomain {
    domain: String,
}

#[derive(Deserialize)]
struct Create {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsUpdate {
    community_id: Uuid,
    input: CommunitySettingsUpdate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Delete {
    community_id: Uuid,
}

pub struct CommunityModule;

impl ResolverModule for CommunityModule {
    fn name(&self) -> &'static str {
        "community"
    }

    fn type_defs(&self) -> &'static str {
        TYPE_DEFS
    }

    fn resolvers(&self) -> Vec<(FieldKey, ResolverFn)> {
        vec![
            (
                FieldKey::query("community"),
                resolver(|ctx, args| async move {
                    let ById { id } = parse_args(args)?;
                    match ctx.services.community.query_by_id(&ctx.passport, id).await {
                        Ok(view) => to_value(view),
                        Err(e) if e.is_not_found() => Ok(Value::Null),
                        Err(e) => Err(e),
                    }
                }),
            ),
            (
                FieldKey::query("communityByDomain"),
                resolver(|ctx, args| async move {
                    let ByDomain { domain } = parse_args(args)?;
                    match ctx.services.community.query_by_domain(&ctx.passport, &domain).await {
                        Ok(view) => to_value(view),
                        Err(e) if e.is_not_found() => Ok(Value::Null),
                        Err(e) => Err(e),
                    }
                }),
            ),
            (
                FieldKey::mutation("communityCreate"),
                resolver(|ctx, args| async move {
                    let Create { name } = parse_args(args)?;
                    let created_by = current_user(&ctx)?;
                    let view = ctx
                        .services
                        .community
                        .create_community(&ctx.passport, &name, created_by)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("communitySettingsUpdate"),
                resolver(|ctx, args| async move {
                    let SettingsUpdate {
                        community_id,
                        input,
                    } = parse_args(args)?;
                    let view = ctx
                        .services
                        .community
                        .update_settings(&ctx.passport, community_id, input)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("communityDelete"),
                resolver(|ctx, args| async move {
                    let Delete { community_id } = parse_args(args)?;
                    ctx.services
                        .community
                        .delete_community(&ctx.passport, community_id)
                        .await?;
                    Ok::<_, DomainError>(Value::Bool(true))
                }),
            ),
        ]
    }

    fn permissions(&self) -> Vec<(FieldKey, PermissionRule)> {
        let manage = PermissionRule::CommunityPermission {
            arg: "communityId",
            permission: Permission::ManageCommunitySettings,
        };
        vec![
            (FieldKey::query("community"), PermissionRule::Allow),
            (FieldKey::query("communityByDomain"), PermissionRule::Allow),
            (FieldKey::mutation("communityCreate"), PermissionRule::Authenticated),
            (FieldKey::mutation("communitySettingsUpdate"), manage.clone()),
            (FieldKey::mutation("communityDelete"), manage),
        ]
    }
}
