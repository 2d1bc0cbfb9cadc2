use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ============================================================================
// Event Envelope - Event Metadata for the Bus
// ============================================================================
//
// Wraps domain events with metadata once they leave the unit of work.
//
// ============================================================================

/// A committed domain event plus the aggregate and transaction it came from.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub aggregate_version: u64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,      // What event caused this one
    pub correlation_id: Uuid,            // The transaction that committed it

    // Timing
    pub timestamp: DateTime<Utc>,

    // Additional Metadata
    pub metadata: HashMap<String, String>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_type: &str,
        aggregate_version: u64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id: event_data.aggregate_id(),
            aggregate_type: aggregate_type.to_string(),
            aggregate_version,
            event_type: event_data.event_type().to_string(),
            event_version: E::event_version(),
            event_data,
            causation_id: None,
            correlation_id,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Common capability of every domain event: a fixed type tag and the id of
/// the aggregate that raised it.
///
/// Events are a closed tagged union per application; the tag lets a
/// dispatcher route without knowing concrete payload types, and payloads are
/// reached by matching on the union.
pub trait DomainEvent:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    fn event_type(&self) -> &'static str;

    fn aggregate_id(&self) -> Uuid;

    fn event_version() -> i32
    where
        Self: Sized,
    {
        1
    }
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> anyhow::Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Deserialize an event, enforcing the payload shape declared by `E`.
pub fn deserialize_event<E: DeserializeOwned>(json: &str) -> anyhow::Result<E> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Tests
// ============================================================================
