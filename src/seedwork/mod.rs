// ============================================================================
// Seedwork - Generic Domain Building Blocks
// ============================================================================
//
// Reusable DDD infrastructure shared by every bounded context.
// Domain-specific code is in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - value objects, events, aggregates, errors)
pub mod core;
// Persistence contracts (GENERIC - repositories and unit of work)
pub mod store;

// Re-export core infrastructure
pub use self::core::*;
pub use self::store::*;
