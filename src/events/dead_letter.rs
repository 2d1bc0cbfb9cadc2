use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::seedwork::EventEnvelope;

// ============================================================================
// Dead Letter Queue
// ============================================================================
//
// Holds events whose handler failed permanently or ran out of retries.
// Provides:
// - Queryable storage for manual intervention
// - Statistics on failure patterns by event type
//
// The queue is bounded: once full, the oldest entry is dropped for each new
// one. Operators take entries out with `remove` (one) or `drain` (all).
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct DeadLetter<E> {
    pub id: Uuid,
    pub handler: String,
    pub envelope: EventEnvelope<E>,
    pub error_message: String,
    pub failure_count: u32,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DlqStats {
    pub total_messages: usize,
    pub by_event_type: HashMap<String, usize>,
}

pub const DEFAULT_CAPACITY: usize = 10_000;

pub struct DeadLetterQueue<E> {
    messages: Mutex<VecDeque<DeadLetter<E>>>,
    capacity: usize,
    metrics: Arc<Metrics>,
}

impl<E: Clone> DeadLetterQueue<E> {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, metrics)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize, metrics: Arc<Metrics>) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            metrics,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn push(
        &self,
        handler: &str,
        envelope: EventEnvelope<E>,
        error_message: String,
        failure_count: u32,
    ) {
        tracing::error!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            aggregate_id = %envelope.aggregate_id,
            handler = handler,
            error = %error_message,
            failure_count = failure_count,
            "💀 Adding message to Dead Letter Queue"
        );

        self.metrics.record_dead_letter(&envelope.event_type);
        let mut messages = self.messages.lock().await;
        while messages.len() >= self.capacity {
            if let Some(dropped) = messages.pop_front() {
                tracing::warn!(
                    dead_letter_id = %dropped.id,
                    event_type = %dropped.envelope.event_type,
                    capacity = self.capacity,
                    "Dead Letter Queue full, dropping oldest message"
                );
            }
        }
        messages.push_back(DeadLetter {
            id: Uuid::now_v7(),
            handler: handler.to_string(),
            envelope,
            error_message,
            failure_count,
            failed_at: Utc::now(),
        });
    }

    /// Oldest first, at most `limit` entries.
    pub async fn list(&self, limit: usize) -> Vec<DeadLetter<E>> {
        self.messages.lock().await.iter().take(limit).cloned().collect()
    }

    /// Take one entry out, typically after it was replayed by hand.
    pub async fn remove(&self, id: Uuid) -> Option<DeadLetter<E>> {
        let mut messages = self.messages.lock().await;
        let index = messages.iter().position(|message| message.id == id)?;
        messages.remove(index)
    }

    /// Take every entry out, oldest first.
    pub async fn drain(&self) -> Vec<DeadLetter<E>> {
        self.messages.lock().await.drain(..).collect()
    }

    pub async fn stats(&self) -> DlqStats {
        let messages = self.messages.lock().await;
        let mut by_event_type = HashMap::new();
        for message in messages.iter() {
            *by_event_type
                .entry(message.envelope.event_type.clone())
                .or_insert(0) += 1;
        }
        DlqStats {
            total_messages: messages.len(),
            by_event_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::community::CommunityCreated;
    use crate::domain::member::MemberCreated;
    use crate::domain::PlatformEvent;

    fn envelope(event: PlatformEvent) -> EventEnvelope<PlatformEvent> {
        EventEnvelope::new("Test", 1, event, Uuid::now_v7())
    }

    #[tokio::test]
    async fn test_stats_group_by_event_type() {
        let dlq = DeadLetterQueue::new(Arc::new(Metrics::new().unwrap()));
        let community_created = PlatformEvent::from(CommunityCreated {
            community_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
        });
        let member_created = PlatformEvent::from(MemberCreated {
            member_id: Uuid::new_v4(),
            community_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        });

        dlq.push("a", envelope(community_created.clone()), "boom".into(), 3).await;
        dlq.push("b", envelope(community_created), "boom".into(), 1).await;
        dlq.push("a", envelope(member_created), "boom".into(), 1).await;

        let stats = dlq.stats().await;
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.by_event_type["CommunityCreated"], 2);
        assert_eq!(stats.by_event_type["MemberCreated"], 1);

        let listed = dlq.list(2).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].handler, "a");
        assert_eq!(listed[0].failure_count, 3);
    }

    fn community_created() -> EventEnvelope<PlatformEvent> {
        envelope(PlatformEvent::from(CommunityCreated {
            community_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
        }))
    }

    #[tokio::test]
    async fn test_full_queue_drops_oldest() {
        let dlq = DeadLetterQueue::with_capacity(2, Arc::new(Metrics::new().unwrap()));
        for handler in ["first", "second", "third"] {
            dlq.push(handler, community_created(), "boom".into(), 1).await;
        }

        let handlers: Vec<String> = dlq.list(10).await.into_iter().map(|m| m.handler).collect();
        assert_eq!(handlers, vec!["second", "third"]);
        assert_eq!(dlq.stats().await.total_messages, 2);
    }

    #[tokio::test]
    async fn test_remove_and_drain() {
        let dlq = DeadLetterQueue::new(Arc::new(Metrics::new().unwrap()));
        assert_eq!(dlq.capacity(), DEFAULT_CAPACITY);
        for handler in ["a", "b", "c"] {
            dlq.push(handler, community_created(), "boom".into(), 1).await;
        }

        let middle = dlq.list(3).await[1].id;
        let removed = dlq.remove(middle).await.unwrap();
        assert_eq!(removed.handler, "b");
        assert!(dlq.remove(middle).await.is_none());

        let drained: Vec<String> = dlq.drain().await.into_iter().map(|m| m.handler).collect();
        assert_eq!(drained, vec!["a", "c"]);
        assert_eq!(dlq.stats().await, DlqStats::default());
    }
}
