// ============================================================================
// Seedwork Core - Generic Domain Abstractions
// ============================================================================
//
// Key Principles:
// - No domain-specific code (no Community, Member, VendorUser, etc.)
// - Generic over aggregate and event types
// - Reusable across all bounded contexts
//
// ============================================================================

pub mod aggregate;
pub mod error;
pub mod event;
pub mod value_object;

// Re-export core types for convenience
pub use aggregate::{AggregateCore, AggregateRoot};
pub use error::{DomainError, ValidationError};
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope};
pub use value_object::{CollectionConstraints, StringConstraints, ValueObject};
