use serde_json::json;
use std::collections::HashMap;
use std::fs;

use community_platform::config::AppConfig;
use community_platform::domain::member::Role;
use community_platform::domain::{Passport, Permission};
use community_platform::Platform;

fn platform_with(vars: &[(&str, &str)]) -> Platform {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Platform::build(AppConfig::from_vars(vars).unwrap()).unwrap()
}

#[tokio::test]
async fn community_lifecycle_through_the_schema() {
    let platform = platform_with(&[]);
    let system = platform.context(Passport::system());

    // Identity-provider sync registers two users.
    let mut users = Vec::new();
    for (last, first) in [("Lovelace", "Ada"), ("Babbage", "Charles")] {
        let external_id = uuid::Uuid::new_v4().to_string();
        platform
            .schema
            .resolve_field(
                &system,
                "Mutation",
                "vendorUserCreateIfNotExists",
                json!({ "externalId": external_id, "lastName": last, "firstName": first }),
            )
            .await
            .unwrap();
        users.push(external_id);
    }
    let (ada, charles) = (&users[0], &users[1]);

    // Ada founds a community and becomes its admin.
    let ctx = platform.context_for_external_id(ada).await.unwrap();
    let community = platform
        .schema
        .resolve_field(&ctx, "Mutation", "communityCreate", json!({ "name": "Engines" }))
        .await
        .unwrap();
    let community_id = community["id"].clone();

    let ctx = platform.context_for_external_id(ada).await.unwrap();
    let parsed_id: uuid::Uuid = serde_json::from_value(community_id.clone()).unwrap();
    assert!(ctx.passport.can(parsed_id, Permission::ManageCommunitySettings));

    platform
        .schema
        .resolve_field(
            &ctx,
            "Mutation",
            "communitySettingsUpdate",
            json!({
                "communityId": community_id,
                "input": { "domain": "Engines.Example.com", "whiteLabelDomain": "engines.ada.dev" }
            }),
        )
        .await
        .unwrap();

    // Both hosts resolve to the community, case-insensitively.
    let guest = platform.context(Passport::guest());
    for host in ["engines.example.com", "ENGINES.ADA.DEV"] {
        let found = platform
            .schema
            .resolve_field(&guest, "Query", "communityByDomain", json!({ "domain": host }))
            .await
            .unwrap();
        assert_eq!(found["id"], community_id);
    }

    // Charles joins as a plain member and cannot change settings.
    let charles_ctx = platform.context_for_external_id(charles).await.unwrap();
    let joined = platform
        .schema
        .resolve_field(
            &charles_ctx,
            "Mutation",
            "memberJoin",
            json!({ "communityId": community_id, "memberName": "charles" }),
        )
        .await
        .unwrap();
    assert_eq!(joined["role"], json!(Role::Member));

    let denied = platform
        .schema
        .resolve_field(
            &charles_ctx,
            "Mutation",
            "communitySettingsUpdate",
            json!({ "communityId": community_id, "input": { "name": "Difference Engines" } }),
        )
        .await
        .unwrap_err();
    assert_eq!(denied.code(), "PERMISSION_DENIED");

    // Charles edits his own profile; an invalid edit changes nothing.
    let updated = platform
        .schema
        .resolve_field(
            &charles_ctx,
            "Mutation",
            "memberProfileUpdate",
            json!({ "memberId": joined["id"], "input": { "interests": ["gears", "cards"] } }),
        )
        .await
        .unwrap();
    assert_eq!(updated["profile"]["interests"], json!(["gears", "cards"]));

    let too_many: Vec<String> = (0..21).map(|i| format!("topic{i}")).collect();
    let err = platform
        .schema
        .resolve_field(
            &charles_ctx,
            "Mutation",
            "memberProfileUpdate",
            json!({ "memberId": joined["id"], "input": { "interests": too_many } }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let members = platform
        .schema
        .resolve_field(
            &charles_ctx,
            "Query",
            "membersByCommunity",
            json!({ "communityId": community_id }),
        )
        .await
        .unwrap();
    assert_eq!(members.as_array().map(Vec::len), Some(2));
    assert_eq!(members[1]["profile"]["interests"], json!(["gears", "cards"]));

    assert_eq!(platform.event_bus.dead_letters().stats().await.total_messages, 0);
}

#[tokio::test]
async fn blocked_users_fall_back_to_guest() {
    let platform = platform_with(&[]);
    let system = Passport::system();
    let external_id = uuid::Uuid::new_v4().to_string();

    let user = platform
        .services
        .vendor_user
        .create_if_not_exists(&system, &external_id, "Hopper", Some("Grace"))
        .await
        .unwrap();

    let err = platform
        .services
        .vendor_user
        .set_access_blocked(&Passport::for_user(user.id), user.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    platform
        .services
        .vendor_user
        .set_access_blocked(&system, user.id, true)
        .await
        .unwrap();
    let ctx = platform.context_for_external_id(&external_id).await.unwrap();
    assert!(!ctx.passport.is_authenticated());

    platform
        .services
        .vendor_user
        .set_access_blocked(&system, user.id, false)
        .await
        .unwrap();
    let ctx = platform.context_for_external_id(&external_id).await.unwrap();
    assert_eq!(ctx.passport.user_id(), Some(user.id));
}

#[tokio::test]
async fn discovered_type_definitions_join_the_schema() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("announcements.graphql"),
        "type Announcement {\n  id: UUID!\n  body: String!\n}\n\nextend type Community {\n  pinned: Announcement\n}\n",
    )
    .unwrap();
    let schema_dir = dir.path().display().to_string();

    let platform = platform_with(&[("COMMUNITY_GRAPHQL__SCHEMA_DIR", schema_dir.as_str())]);
    assert!(platform.schema.type_defs().contains("type Announcement"));
    assert!(platform.schema.type_defs().contains("extend type Community"));

    // Redefining a module's type is rejected at startup.
    fs::write(dir.path().join("member.graphql"), "type Member { id: UUID! }").unwrap();
    let config = AppConfig::from_vars(HashMap::from([(
        "COMMUNITY_GRAPHQL__SCHEMA_DIR".to_string(),
        schema_dir,
    )]))
    .unwrap();
    assert!(Platform::build(config).is_err());
}
