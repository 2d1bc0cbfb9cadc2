// ============================================================================
// Community Context
// ============================================================================
//
// - Value objects (CommunityName, Domain, WhiteLabelDomain, Handle)
// - Events (CommunityCreated, CommunityDomainUpdated, ...)
// - Aggregate (Community with its settings rules)
// - Repository contract (CommunityRepository)
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
