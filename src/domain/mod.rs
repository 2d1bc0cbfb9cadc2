// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// One subdirectory per bounded context, each with:
// - Value objects
// - Events (payloads of the shared PlatformEvent union)
// - Aggregate implementation
// - Repository contract
//
// This layer only depends on the seedwork; storage lives in `persistence`.
//
// ============================================================================

pub mod passport;
pub mod value_objects;
pub mod events;

pub mod community;
pub mod vendor_user;
pub mod member;

pub use events::{event_types, PlatformEvent};
pub use passport::{Passport, Permission, Principal};
pub use value_objects::Email;
