use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use community_platform::application::CommunitySettingsUpdate;
use community_platform::config::AppConfig;
use community_platform::domain::member::ProfileUpdate;
use community_platform::domain::Passport;
use community_platform::{metrics, Platform};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("🚀 Starting {}", config.service_name);

    // === 1. Wire the platform ===
    let platform = Platform::build(config)?;

    // === 2. Metrics HTTP server in a background thread ===
    if platform.config.metrics.enabled {
        let registry = Arc::new(platform.metrics.registry().clone());
        let service_name = platform.config.service_name.clone();
        let host = platform.config.metrics.host.clone();
        let port = platform.config.metrics.port;
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                if let Err(e) =
                    metrics::start_metrics_server(registry, service_name, host, port).await
                {
                    tracing::error!("Metrics server error: {}", e);
                }
            });
        });
    }

    tracing::info!(
        "🧩 GraphQL schema: {} type definition bytes, fields {:?}",
        platform.schema.type_defs().len(),
        platform.schema.fields()
    );

    // === 3. Demonstrate a community lifecycle ===
    tracing::info!("📝 Demonstrating community lifecycle");
    let system = Passport::system();

    let external_id = uuid::Uuid::new_v4().to_string();
    let user = platform
        .services
        .vendor_user
        .create_if_not_exists(&system, &external_id, "Lovelace", Some("Ada"))
        .await?;
    tracing::info!("✅ Vendor user registered: {} ({})", user.display_name, user.id);

    let passport = platform.services.passport.for_external_id(&external_id).await?;
    let community = platform
        .services
        .community
        .create_community(&passport, "Analytical Engines", user.id)
        .await?;
    tracing::info!("✅ Community created: {}", community.id);

    // Creating the community made the creator its admin; reissue the passport
    let passport = platform.services.passport.for_external_id(&external_id).await?;
    let community = platform
        .services
        .community
        .update_settings(
            &passport,
            community.id,
            CommunitySettingsUpdate {
                domain: Some("engines.example.com".to_string()),
                handle: Some("engines".to_string()),
                ..Default::default()
            },
        )
        .await?;
    tracing::info!(
        "✅ Community settings updated: domain={:?} handle={:?}",
        community.domain,
        community.handle
    );

    let members = platform
        .services
        .member
        .query_by_community(&passport, community.id)
        .await?;
    for member in &members {
        let member = platform
            .services
            .member
            .update_profile(
                &passport,
                member.id,
                ProfileUpdate {
                    bio: Some("First programmer".to_string()),
                    interests: Some(vec!["mathematics".to_string(), "poetry".to_string()]),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!("✅ Member profile updated: {} ({:?})", member.member_name, member.role);
    }

    let dlq = platform.event_bus.dead_letters().stats().await;
    tracing::info!("💀 Dead letters after demo: {}", dlq.total_messages);

    tracing::info!("🎉 Demo complete!");

    if platform.config.metrics.enabled {
        tracing::info!("⏳ Serving metrics until Ctrl+C");
        tokio::signal::ctrl_c().await?;
        tracing::info!("👋 Shutting down");
    }

    // The queue lives in memory; report what is lost with it.
    for letter in platform.event_bus.dead_letters().drain().await {
        tracing::warn!(
            dead_letter_id = %letter.id,
            event_type = %letter.envelope.event_type,
            handler = %letter.handler,
            error = %letter.error_message,
            "Unreplayed dead letter at shutdown"
        );
    }

    Ok(())
}
