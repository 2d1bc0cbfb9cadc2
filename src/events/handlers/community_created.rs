use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::application::DataSources;
use crate::domain::community::CommunityCreated;
use crate::domain::member::{MemberRepository, Role};
use crate::domain::{event_types, Passport, PlatformEvent};
use crate::events::registry::{EventHandlerRegistryBuilder, HandlerError};
use crate::seedwork::{DomainError, EventEnvelope, Repository, UnitOfWork};

// ============================================================================
// CommunityCreated -> admin membership for the creator
// ============================================================================

pub const HANDLER_NAME: &str = "create_admin_member";

/// Used when the creator has no vendor-user record to take a name from.
const FALLBACK_MEMBER_NAME: &str = "Administrator";

/// Holds the data sources weakly: they own the units of work that reach
/// this handler through the bus.
pub fn register(
    builder: &mut EventHandlerRegistryBuilder<PlatformEvent>,
    data_sources: Weak<DataSources>,
) {
    builder.register(event_types::COMMUNITY_CREATED, HANDLER_NAME, move |envelope| {
        let data_sources = data_sources.clone();
        async move { create_admin_member(data_sources, envelope).await }
    });
}

async fn create_admin_member(
    data_sources: Weak<DataSources>,
    envelope: EventEnvelope<PlatformEvent>,
) -> Result<(), HandlerError> {
    let PlatformEvent::CommunityCreated(CommunityCreated {
        community_id,
        created_by,
    }) = envelope.event_data
    else {
        return Err(HandlerError::Permanent(format!(
            "{HANDLER_NAME} cannot handle {}",
            envelope.event_type
        )));
    };

    let data_sources = data_sources
        .upgrade()
        .ok_or_else(|| HandlerError::Permanent("data sources are shut down".into()))?;
    let system = Passport::system();

    let member_name = creator_display_name(&data_sources, &system, created_by).await?;

    let created = data_sources
        .member
        .with_transaction(&system, move |repo| {
            Box::pin(async move {
                // Redelivery must not create a second membership.
                match repo.get_by_community_and_user(community_id, created_by).await {
                    Ok(_) => return Ok(false),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }

                let mut member =
                    repo.get_new_instance(community_id, created_by, &member_name, Role::Admin)?;
                repo.save(&mut member).await?;
                Ok(true)
            })
        })
        .await?;

    if created {
        tracing::info!(
            community_id = %community_id,
            user_id = %created_by,
            "Created admin membership for community creator"
        );
    }
    Ok(())
}

async fn creator_display_name(
    data_sources: &Arc<DataSources>,
    system: &Passport,
    user_id: Uuid,
) -> Result<String, DomainError> {
    data_sources
        .vendor_user
        .with_transaction(system, move |repo| {
            Box::pin(async move {
                match repo.get(user_id).await {
                    Ok(user) => Ok(user.display_name()),
                    Err(e) if e.is_not_found() => Ok(FALLBACK_MEMBER_NAME.to_string()),
                    Err(e) => Err(e),
                }
            })
        })
        .await
}
