use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::member::{ProfileUpdate, Role};
use crate::domain::Permission;
use crate::seedwork::DomainError;
use crate::graphql::schema::{resolver, FieldKey, PermissionRule, ResolverFn, ResolverModule};
use super::{current_user, parse_args, to_value};

const TYPE_DEFS: &str = r#"
enum Role {
  ADMIN
  MEMBER
}

type MemberProfile {
  name: String
  email: String
  bio: String
  interests: [String!]!
}

type Member {
  id: UUID!
  communityId: UUID!
  userId: UUID!
  memberName: String!
  role: Role!
  profile: MemberProfile!
  createdAt: DateTime!
  updatedAt: DateTime!
}

input ProfileInput {
  name: String
  email: String
  bio: String
  interests: [String!]
}

extend type Query {
  member(id: UUID!): Member
  membersByCommunity(communityId: UUID!): [Member!]!
}

extend type Mutation {
  memberJoin(communityId: UUID!, memberName: String!): Member!
  memberAdd(communityId: UUID!, userId: UUID!, memberName: String!, role: Role!): Member!
  memberProfileUpdate(memberId: UUID!, input: ProfileInput!): Member!
  memberRename(memberId: UUID!, memberName: String!): Member!
  memberRoleChange(memberId: UUID!, role: Role!): Member!
  memberRemove(memberId: UUID!): Boolean!
}
"#;

#[derive(Deserialize)]
struct ById {
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ByCommunity {
    community_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Join {
    community_id: Uuid,
    member_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Add {
    community_id: Uuid,
    user_id: Uuid,
    member_name: String,
    role: Role,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileChange {
    member_id: Uuid,
    input: ProfileUpdate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rename {
    member_id: Uuid,
    member_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleChange {
    member_id: Uuid,
    role: Role,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ByMember {
    member_id: Uuid,
}

pub struct MemberModule;

impl ResolverModule for MemberModule {
    fn name(&self) -> &'static str {
        "member"
    }

    fn type_defs(&self) -> &'static str {
        TYPE_DEFS
    }

    fn resolvers(&self) -> Vec<(FieldKey, ResolverFn)> {
        vec![
            (
                FieldKey::query("member"),
                resolver(|ctx, args| async move {
                    let ById { id } = parse_args(args)?;
                    match ctx.services.member.query_by_id(&ctx.passport, id).await {
                        Ok(view) => to_value(view),
                        Err(e) if e.is_not_found() => Ok(Value::Null),
                        Err(e) => Err(e),
                    }
                }),
            ),
            (
                FieldKey::query("membersByCommunity"),
                resolver(|ctx, args| async move {
                    let ByCommunity { community_id } = parse_args(args)?;
                    let views = ctx
                        .services
                        .member
                        .query_by_community(&ctx.passport, community_id)
                        .await?;
                    to_value(views)
                }),
            ),
            (
                FieldKey::mutation("memberJoin"),
                resolver(|ctx, args| async move {
                    let Join {
                        community_id,
                        member_name,
                    } = parse_args(args)?;
                    let user_id = current_user(&ctx)?;
                    let view = ctx
                        .services
                        .member
                        .create_member(&ctx.passport, community_id, user_id, &member_name, Role::Member)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("memberAdd"),
                resolver(|ctx, args| async move {
                    let Add {
                        community_id,
                        user_id,
                        member_name,
                        role,
                    } = parse_args(args)?;
                    let view = ctx
                        .services
                        .member
                        .create_member(&ctx.passport, community_id, user_id, &member_name, role)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("memberProfileUpdate"),
                resolver(|ctx, args| async move {
                    let ProfileChange { member_id, input } = parse_args(args)?;
                    let view = ctx
                        .services
                        .member
                        .update_profile(&ctx.passport, member_id, input)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("memberRename"),
                resolver(|ctx, args| async move {
                    let Rename {
                        member_id,
                        member_name,
                    } = parse_args(args)?;
                    let view = ctx
                        .services
                        .member
                        .rename_member(&ctx.passport, member_id, &member_name)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("memberRoleChange"),
                resolver(|ctx, args| async move {
                    let RoleChange { member_id, role } = parse_args(args)?;
                    let view = ctx
                        .services
                        .member
                        .change_role(&ctx.passport, member_id, role)
                        .await?;
                    to_value(view)
                }),
            ),
            (
                FieldKey::mutation("memberRemove"),
                resolver(|ctx, args| async move {
                    let ByMember { member_id } = parse_args(args)?;
                    ctx.services.member.remove_member(&ctx.passport, member_id).await?;
                    Ok::<_, DomainError>(Value::Bool(true))
                }),
            ),
        ]
    }

    fn permissions(&self) -> Vec<(FieldKey, PermissionRule)> {
        vec![
            (FieldKey::query("member"), PermissionRule::Authenticated),
            (FieldKey::query("membersByCommunity"), PermissionRule::Authenticated),
            (FieldKey::mutation("memberJoin"), PermissionRule::Authenticated),
            (
                FieldKey::mutation("memberAdd"),
                PermissionRule::CommunityPermission {
                    arg: "communityId",
                    permission: Permission::ManageMembers,
                },
            ),
            // Whether the caller may edit this profile is decided by the aggregate.
            (FieldKey::mutation("memberProfileUpdate"), PermissionRule::Authenticated),
            (FieldKey::mutation("memberRename"), PermissionRule::Authenticated),
            (FieldKey::mutation("memberRoleChange"), PermissionRule::Authenticated),
            (FieldKey::mutation("memberRemove"), PermissionRule::Authenticated),
        ]
    }
}
