use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::events::InProcessEventBus;
use crate::metrics::{outcome, Metrics};
use crate::seedwork::{AggregateRoot, DomainError, DomainEvent, EventEnvelope, UnitOfWork};
use super::document_store::Collection;
use super::repository::InMemoryRepository;

// ============================================================================
// In-Memory Unit of Work
// ============================================================================
//
// Flow of one transaction:
// 1. Open a repository bound to a fresh scope and the caller's passport
// 2. Run the work closure; on error drop the scope (nothing was written)
// 3. Commit the staged writes atomically (version conflicts abort it)
// 4. Publish the collected events, in the order they were raised
//
// Events are published after the collection lock is released, so handlers
// may open transactions of their own.
//
// ============================================================================

pub struct InMemoryUnitOfWork<A: AggregateRoot> {
    collection: Collection<A::Props>,
    event_bus: Arc<InProcessEventBus<A::Event>>,
    metrics: Arc<Metrics>,
}

impl<A: AggregateRoot> InMemoryUnitOfWork<A> {
    pub fn new(event_bus: Arc<InProcessEventBus<A::Event>>, metrics: Arc<Metrics>) -> Self {
        Self {
            collection: Collection::new(A::NAME).with_unique_keys(A::unique_keys),
            event_bus,
            metrics,
        }
    }

    pub fn collection(&self) -> &Collection<A::Props> {
        &self.collection
    }
}

#[async_trait]
impl<A: AggregateRoot> UnitOfWork<A> for InMemoryUnitOfWork<A> {
    type Repository = InMemoryRepository<A>;

    async fn with_transaction<T, F>(
        &self,
        passport: &A::Passport,
        work: F,
    ) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'r> FnOnce(&'r mut Self::Repository) -> BoxFuture<'r, Result<T, DomainError>>
            + Send
            + 'static,
    {
        let transaction_id = Uuid::now_v7();
        let started = Instant::now();
        let mut repository = InMemoryRepository::new(self.collection.clone(), passport.clone());

        let value = match work(&mut repository).await {
            Ok(value) => value,
            Err(error) => {
                self.metrics.record_transaction(
                    A::NAME,
                    outcome::ROLLED_BACK,
                    started.elapsed().as_secs_f64(),
                );
                tracing::warn!(
                    aggregate = A::NAME,
                    transaction_id = %transaction_id,
                    error = %error,
                    "Transaction rolled back"
                );
                return Err(error);
            }
        };

        let changes = repository.into_changes();
        let versions = if changes.writes.is_empty() {
            Default::default()
        } else {
            match self.collection.commit(changes.writes).await {
                Ok(versions) => versions,
                Err(error) => {
                    self.metrics.record_transaction(
                        A::NAME,
                        outcome::CONFLICT,
                        started.elapsed().as_secs_f64(),
                    );
                    tracing::warn!(
                        aggregate = A::NAME,
                        transaction_id = %transaction_id,
                        error = %error,
                        "Transaction aborted on commit"
                    );
                    return Err(error);
                }
            }
        };

        self.metrics.record_transaction(
            A::NAME,
            outcome::COMMITTED,
            started.elapsed().as_secs_f64(),
        );
        tracing::debug!(
            aggregate = A::NAME,
            transaction_id = %transaction_id,
            writes = versions.len(),
            events = changes.events.len(),
            "Transaction committed"
        );

        if !changes.events.is_empty() {
            let envelopes = changes
                .events
                .into_iter()
                .map(|event| {
                    let version = versions.get(&event.aggregate_id()).copied().unwrap_or_default();
                    EventEnvelope::new(A::NAME, version, event, transaction_id)
                })
                .collect();
            self.event_bus.publish_all(envelopes).await;
        }

        Ok(value)
    }
}
