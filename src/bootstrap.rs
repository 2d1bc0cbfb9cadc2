use anyhow::Context;
use std::sync::Arc;

use crate::application::{ApplicationServices, DataSources};
use crate::config::AppConfig;
use crate::domain::{Passport, PlatformEvent};
use crate::events::{handlers, EventHandlerRegistryBuilder, InProcessEventBus};
use crate::graphql::{platform_schema, ComposedSchema, GraphContext};
use crate::metrics::Metrics;
use crate::seedwork::DomainError;
use crate::utils::RetryConfig;

// ============================================================================
// Platform Bootstrap
// ============================================================================
//
// Wiring order matters:
//   1. Metrics registry
//   2. Event bus (no registry yet)
//   3. Data sources publishing to the bus
//   4. Handler registry built once, then attached to the bus
//   5. Application services and the composed GraphQL schema
//
// ============================================================================

pub struct Platform {
    pub config: AppConfig,
    pub metrics: Arc<Metrics>,
    pub event_bus: Arc<InProcessEventBus<PlatformEvent>>,
    pub data_sources: Arc<DataSources>,
    pub services: Arc<ApplicationServices>,
    pub schema: Arc<ComposedSchema>,
}

impl Platform {
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new()?);
        tracing::info!(
            "📊 Metrics registry created with {} metrics",
            metrics.registry().gather().len()
        );

        let retry = RetryConfig::from(&config.event_bus);
        let event_bus = Arc::new(
            InProcessEventBus::new(retry, metrics.clone())
                .with_dead_letter_capacity(config.event_bus.dead_letter_capacity),
        );
        let data_sources = Arc::new(DataSources::in_memory(event_bus.clone(), metrics.clone()));

        let mut builder = EventHandlerRegistryBuilder::new();
        handlers::register_all(&mut builder, &data_sources);
        let registry = builder.build();
        tracing::info!(
            handlers = registry.handler_count(),
            event_types = ?registry.event_types(),
            "Integration event handlers registered"
        );
        event_bus.attach_registry(registry)?;

        let services = Arc::new(ApplicationServices::new(data_sources.clone()));

        let schema = platform_schema(
            config.graphql.default_rule()?,
            config.graphql.schema_dir.clone(),
            metrics.clone(),
        )
        .context("failed to compose GraphQL schema")?;

        tracing::info!(service = %config.service_name, "✅ Platform ready");

        Ok(Self {
            config,
            metrics,
            event_bus,
            data_sources,
            services,
            schema: Arc::new(schema),
        })
    }

    pub fn context(&self, passport: Passport) -> GraphContext {
        GraphContext::new(passport, self.services.clone())
    }

    /// Request context for a caller identified by the identity provider.
    pub async fn context_for_external_id(
        &self,
        external_id: &str,
    ) -> Result<GraphContext, DomainError> {
        let passport = self.services.passport.for_external_id(external_id).await?;
        Ok(self.context(passport))
    }
}
