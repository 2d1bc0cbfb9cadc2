// ============================================================================
// Application Services - One Facade per Bounded Context
// ============================================================================
//
// Each method takes the caller's passport plus use-case arguments, runs one
// unit of work per aggregate it touches and returns a serializable view.
// Domain errors are returned unchanged.
//
// ============================================================================

pub mod community;
pub mod data_sources;
pub mod member;
pub mod passport;
pub mod vendor_user;

use std::sync::Arc;

pub use community::{CommunityApplicationService, CommunitySettingsUpdate, CommunityView};
pub use data_sources::DataSources;
pub use member::{MemberApplicationService, MemberView, ProfileView};
pub use passport::{permissions_for, PassportService};
pub use vendor_user::{VendorUserApplicationService, VendorUserView};

/// Every application service, sharing one set of data sources.
#[derive(Clone)]
pub struct ApplicationServices {
    pub community: CommunityApplicationService,
    pub vendor_user: VendorUserApplicationService,
    pub member: MemberApplicationService,
    pub passport: PassportService,
}

impl ApplicationServices {
    pub fn new(data_sources: Arc<DataSources>) -> Self {
        Self {
            community: CommunityApplicationService::new(data_sources.clone()),
            vendor_user: VendorUserApplicationService::new(data_sources.clone()),
            member: MemberApplicationService::new(data_sources.clone()),
            passport: PassportService::new(data_sources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{ProfileUpdate, Role};
    use crate::domain::vendor_user::PersonalInformation;
    use crate::domain::{Passport, Permission};
    use crate::events::{handlers, EventHandlerRegistryBuilder, InProcessEventBus};
    use crate::metrics::Metrics;
    use crate::seedwork::{DomainError, ValidationError};
    use crate::utils::RetryConfig;
    use uuid::Uuid;

    struct Fixture {
        services: ApplicationServices,
        _data_sources: Arc<DataSources>,
    }

    fn fixture(with_handlers: bool) -> Fixture {
        let metrics = Arc::new(Metrics::new().unwrap());
        let bus = Arc::new(InProcessEventBus::new(RetryConfig::no_retry(), metrics.clone()));
        let data_sources = Arc::new(DataSources::in_memory(bus.clone(), metrics));

        let mut builder = EventHandlerRegistryBuilder::new();
        if with_handlers {
            handlers::register_all(&mut builder, &data_sources);
        }
        bus.attach_registry(builder.build()).unwrap();

        Fixture {
            services: ApplicationServices::new(data_sources.clone()),
            _data_sources: data_sources,
        }
    }

    #[tokio::test]
    async fn test_creator_becomes_admin_and_can_manage_settings() {
        let Fixture { services, .. } = fixture(true);
        let creator = Uuid::new_v4();

        let community = services
            .community
            .create_community(&Passport::for_user(creator), "Oak Park", creator)
            .await
            .unwrap();

        let members = services
            .member
            .query_by_community(&Passport::for_user(creator), community.id)
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Role::Admin);

        let passport = services.passport.for_user(creator).await.unwrap();
        assert!(passport.can(community.id, Permission::ManageCommunitySettings));

        let updated = services
            .community
            .update_settings(
                &passport,
                community.id,
                CommunitySettingsUpdate {
                    domain: Some("oak.example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.domain.as_deref(), Some("oak.example.com"));

        let by_domain = services
            .community
            .query_by_domain(&Passport::guest(), "oak.example.com")
            .await
            .unwrap();
        assert_eq!(by_domain.id, community.id);
    }

    #[tokio::test]
    async fn test_plain_user_cannot_update_settings() {
        let Fixture { services, .. } = fixture(true);
        let creator = Uuid::new_v4();
        let community = services
            .community
            .create_community(&Passport::for_user(creator), "Oak Park", creator)
            .await
            .unwrap();

        let err = services
            .community
            .update_settings(
                &Passport::for_user(Uuid::new_v4()),
                community.id,
                CommunitySettingsUpdate {
                    name: Some("Hijacked".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_domain_must_be_unique() {
        let Fixture { services, .. } = fixture(false);
        let system = Passport::system();
        let creator = Uuid::new_v4();

        let first = services.community.create_community(&system, "First", creator).await.unwrap();
        let second = services.community.create_community(&system, "Second", creator).await.unwrap();
        let claim = CommunitySettingsUpdate {
            domain: Some("shared.example.com".into()),
            ..Default::default()
        };

        services.community.update_settings(&system, first.id, claim.clone()).await.unwrap();
        let err = services
            .community
            .update_settings(&system, second.id, claim)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_community() {
        let Fixture { services, .. } = fixture(false);
        let system = Passport::system();
        let community = services
            .community
            .create_community(&system, "Short Lived", Uuid::new_v4())
            .await
            .unwrap();

        services.community.delete_community(&system, community.id).await.unwrap();
        let err = services.community.query_by_id(&system, community.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_vendor_user_is_idempotent() {
        let Fixture { services, .. } = fixture(false);
        let external_id = Uuid::new_v4().to_string();

        let first = services
            .vendor_user
            .create_if_not_exists(&Passport::guest(), &external_id, "Lovelace", Some("Ada"))
            .await
            .unwrap();
        let second = services
            .vendor_user
            .create_if_not_exists(&Passport::guest(), &external_id, "Ignored", None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "Ada Lovelace");

        let err = services
            .vendor_user
            .create_if_not_exists(&Passport::guest(), &Uuid::new_v4().to_string(), "", None)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::Empty { field: "lastName" }));
    }

    #[tokio::test]
    async fn test_user_updates_own_personal_information() {
        let Fixture { services, .. } = fixture(false);
        let user = services
            .vendor_user
            .create_if_not_exists(&Passport::guest(), &Uuid::new_v4().to_string(), "Hopper", None)
            .await
            .unwrap();

        let updated = services
            .vendor_user
            .update_personal_information(
                &Passport::for_user(user.id),
                user.id,
                PersonalInformation {
                    first_name: Some("Grace".into()),
                    email: Some("grace@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Grace Hopper");

        let by_external = services
            .vendor_user
            .query_by_external_id(&Passport::guest(), &user.external_id)
            .await
            .unwrap();
        assert_eq!(by_external.email.as_deref(), Some("grace@example.com"));
    }

    #[tokio::test]
    async fn test_member_joins_once_and_edits_profile() {
        let Fixture { services, .. } = fixture(false);
        let system = Passport::system();
        let community = services
            .community
            .create_community(&system, "Oak Park", Uuid::new_v4())
            .await
            .unwrap();

        let user = Uuid::new_v4();
        let me = Passport::for_user(user);
        let member = services
            .member
            .create_member(&me, community.id, user, "ada", Role::Member)
            .await
            .unwrap();

        let again = services
            .member
            .create_member(&me, community.id, user, "ada", Role::Member)
            .await
            .unwrap_err();
        assert!(again.is_conflict());

        let updated = services
            .member
            .update_profile(
                &me,
                member.id,
                ProfileUpdate {
                    bio: Some("Poet of science".into()),
                    interests: Some(vec!["engines".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.profile.interests, vec!["engines"]);

        let too_long = services
            .member
            .update_profile(
                &me,
                member.id,
                ProfileUpdate {
                    bio: Some("b".repeat(2001)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(too_long.is_validation());
        let unchanged = services.member.query_by_id(&me, member.id).await.unwrap();
        assert_eq!(unchanged.profile.bio.as_deref(), Some("Poet of science"));
    }

    #[tokio::test]
    async fn test_cannot_join_missing_community() {
        let Fixture { services, .. } = fixture(false);
        let user = Uuid::new_v4();
        let err = services
            .member
            .create_member(&Passport::for_user(user), Uuid::new_v4(), user, "ada", Role::Member)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_create_one_membership() {
        let Fixture { services, .. } = fixture(false);
        let creator = Uuid::new_v4();
        let community = services
            .community
            .create_community(&Passport::for_user(creator), "Oak Park", creator)
            .await
            .unwrap();

        let community_id = community.id;
        let user = Uuid::new_v4();
        let joins = (0..8).map(|i| {
            let members = services.member.clone();
            tokio::spawn(async move {
                members
                    .create_member(
                        &Passport::for_user(user),
                        community_id,
                        user,
                        &format!("ada{i}"),
                        Role::Member,
                    )
                    .await
            })
        });
        let results = futures_util::future::join_all(joins).await;

        let joined = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        assert_eq!(joined, 1);
        assert!(results
            .iter()
            .all(|r| matches!(r, Ok(Ok(_))) || matches!(r, Ok(Err(e)) if e.is_conflict())));

        let members = services
            .member
            .query_by_community(&Passport::system(), community_id)
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_domain_claims_admit_one_community() {
        let Fixture { services, .. } = fixture(false);
        let creator = Uuid::new_v4();
        let mut ids = Vec::new();
        for name in ["Oak Park", "Elm Park", "Ash Park", "Fir Park"] {
            let community = services
                .community
                .create_community(&Passport::for_user(creator), name, creator)
                .await
                .unwrap();
            ids.push(community.id);
        }

        let claims = ids.iter().enumerate().map(|(i, id)| {
            let communities = services.community.clone();
            let id = *id;
            // Either field, any case: all four claim one host.
            let update = if i % 2 == 0 {
                CommunitySettingsUpdate {
                    domain: Some("park.example.com".to_string()),
                    ..Default::default()
                }
            } else {
                CommunitySettingsUpdate {
                    white_label_domain: Some("PARK.example.com".to_string()),
                    ..Default::default()
                }
            };
            tokio::spawn(async move {
                communities
                    .update_settings(&Passport::system(), id, update)
                    .await
            })
        });
        let results = futures_util::future::join_all(claims).await;

        assert_eq!(results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count(), 1);
        let owner = services
            .community
            .query_by_domain(&Passport::guest(), "park.example.com")
            .await
            .unwrap();
        assert!(ids.contains(&owner.id));
    }

    #[tokio::test]
    async fn test_unknown_external_id_gets_guest_passport() {
        let Fixture { services, .. } = fixture(false);
        let passport = services
            .passport
            .for_external_id(&Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert!(!passport.is_authenticated());
    }
}
