use std::sync::{Arc, OnceLock};

use crate::metrics::{outcome, Metrics};
use crate::seedwork::{DomainEvent, EventEnvelope};
use crate::utils::{retry_on_transient, RetryConfig, RetryOutcome};
use super::dead_letter::DeadLetterQueue;
use super::registry::EventHandlerRegistry;

// ============================================================================
// In-Process Event Bus
// ============================================================================
//
// Receives envelopes from units of work after their commit and delivers
// them to the handlers registered for each event type:
// 1. Handlers run sequentially, in registration order
// 2. Transient failures are retried with exponential backoff
// 3. Permanent or exhausted failures go to the dead letter queue
//
// A handler failure never undoes the transaction that raised the event.
//
// ============================================================================

/// What happened to one published envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dead_lettered: usize,
}

impl PublishReport {
    fn merge(&mut self, other: PublishReport) {
        self.delivered += other.delivered;
        self.dead_lettered += other.dead_lettered;
    }
}

pub struct InProcessEventBus<E: DomainEvent> {
    registry: OnceLock<Arc<EventHandlerRegistry<E>>>,
    retry: RetryConfig,
    dead_letters: Arc<DeadLetterQueue<E>>,
    metrics: Arc<Metrics>,
}

impl<E: DomainEvent> InProcessEventBus<E> {
    pub fn new(retry: RetryConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            registry: OnceLock::new(),
            retry,
            dead_letters: Arc::new(DeadLetterQueue::new(metrics.clone())),
            metrics,
        }
    }

    /// Attach the startup-built registry. Only the first call takes effect.
    pub fn attach_registry(&self, registry: Arc<EventHandlerRegistry<E>>) -> anyhow::Result<()> {
        self.registry
            .set(registry)
            .map_err(|_| anyhow::anyhow!("event handler registry is already attached"))?;
        Ok(())
    }

    /// Replace the dead letter queue with one bounded at `capacity`.
    pub fn with_dead_letter_capacity(mut self, capacity: usize) -> Self {
        self.dead_letters = Arc::new(DeadLetterQueue::with_capacity(capacity, self.metrics.clone()));
        self
    }

    pub fn dead_letters(&self) -> &Arc<DeadLetterQueue<E>> {
        &self.dead_letters
    }

    pub async fn publish(&self, envelope: EventEnvelope<E>) -> PublishReport {
        let mut report = PublishReport::default();
        self.metrics.record_event_published(&envelope.event_type);

        let Some(registry) = self.registry.get() else {
            tracing::warn!(
                event_type = %envelope.event_type,
                "No handler registry attached, event not delivered"
            );
            return report;
        };

        for handler in registry.handlers_for(&envelope.event_type) {
            let operation = format!("{}/{}", envelope.event_type, handler.name());

            let result = retry_on_transient(&operation, &self.retry, |attempt| {
                if attempt > 1 {
                    self.metrics.record_retry_attempt(&operation, attempt);
                }
                handler.call(envelope.clone())
            })
            .await;

            match result {
                RetryOutcome::Succeeded { .. } => {
                    self.metrics.record_handler_invocation(
                        &envelope.event_type,
                        handler.name(),
                        outcome::SUCCESS,
                    );
                    report.delivered += 1;
                }
                RetryOutcome::Exhausted { error, attempts }
                | RetryOutcome::Permanent { error, attempts } => {
                    self.metrics.record_handler_invocation(
                        &envelope.event_type,
                        handler.name(),
                        outcome::FAILED,
                    );
                    self.dead_letters
                        .push(handler.name(), envelope.clone(), error.to_string(), attempts)
                        .await;
                    report.dead_lettered += 1;
                }
            }
        }

        tracing::debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            delivered = report.delivered,
            dead_lettered = report.dead_lettered,
            "Published event"
        );
        report
    }

    /// Publish in order; each envelope is fully handled before the next.
    pub async fn publish_all(&self, envelopes: Vec<EventEnvelope<E>>) -> PublishReport {
        let mut report = PublishReport::default();
        for envelope in envelopes {
            report.merge(self.publish(envelope).await);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::community::CommunityCreated;
    use crate::domain::{event_types, PlatformEvent};
    use crate::events::registry::{EventHandlerRegistryBuilder, HandlerError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    fn bus() -> InProcessEventBus<PlatformEvent> {
        InProcessEventBus::new(
            RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                multiplier: 2.0,
            },
            Arc::new(Metrics::new().unwrap()),
        )
    }

    fn community_created() -> EventEnvelope<PlatformEvent> {
        EventEnvelope::new(
            "Community",
            1,
            PlatformEvent::from(CommunityCreated {
                community_id: Uuid::new_v4(),
                created_by: Uuid::new_v4(),
            }),
            Uuid::now_v7(),
        )
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let bus = bus();
        let calls = Arc::new(AtomicU32::new(0));
        let mut builder = EventHandlerRegistryBuilder::new();
        {
            let calls = calls.clone();
            builder.register(event_types::COMMUNITY_CREATED, "flaky", move |_| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(HandlerError::Transient("try again".into()))
                    } else {
                        Ok(())
                    }
                }
            });
        }
        bus.attach_registry(builder.build()).unwrap();

        let report = bus.publish(community_created()).await;
        assert_eq!(report, PublishReport { delivered: 1, dead_lettered: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_goes_to_dead_letters() {
        let bus = bus();
        let mut builder = EventHandlerRegistryBuilder::new();
        builder
            .register(event_types::COMMUNITY_CREATED, "broken", |_| async {
                Err(HandlerError::Permanent("bad payload".into()))
            })
            .register(event_types::COMMUNITY_CREATED, "after", |_| async { Ok(()) });
        bus.attach_registry(builder.build()).unwrap();

        let report = bus.publish_all(vec![community_created(), community_created()]).await;
        assert_eq!(report, PublishReport { delivered: 2, dead_lettered: 2 });

        let dead = bus.dead_letters().list(10).await;
        assert_eq!(dead.len(), 2);
        assert_eq!(dead[0].handler, "broken");
        assert_eq!(dead[0].failure_count, 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_dead_lettered() {
        let bus = bus();
        let mut builder = EventHandlerRegistryBuilder::new();
        builder.register(event_types::COMMUNITY_CREATED, "always_busy", |_| async {
            Err(HandlerError::Transient("busy".into()))
        });
        bus.attach_registry(builder.build()).unwrap();

        bus.publish(community_created()).await;

        let dead = bus.dead_letters().list(10).await;
        assert_eq!(dead[0].failure_count, 3);
        assert_eq!(bus.dead_letters().stats().await.by_event_type["CommunityCreated"], 1);
    }

    #[tokio::test]
    async fn test_registry_attaches_once() {
        let bus = bus();
        bus.attach_registry(EventHandlerRegistryBuilder::new().build()).unwrap();
        assert!(bus
            .attach_registry(EventHandlerRegistryBuilder::new().build())
            .is_err());
    }
}
