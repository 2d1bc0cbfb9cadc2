// ============================================================================
// Vendor User Context
// ============================================================================
//
// Platform users as known to the identity provider (ExternalId) together
// with their personal information and access state.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod aggregate;
pub mod repository;

pub use value_objects::*;
pub use events::*;
pub use aggregate::*;
pub use repository::*;
