// ============================================================================
// Member Context
// ============================================================================
//
// A vendor user's membership in one community: role plus a profile
// (Name, Email, Bio, Interests).
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
