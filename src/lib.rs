// ============================================================================
// Community Platform - Domain Core
// ============================================================================
//
// Layers, inner to outer:
//   seedwork     generic value objects, events, aggregates, persistence traits
//   domain       community, vendor user and member bounded contexts
//   persistence  in-memory document store, repositories, unit of work
//   events       in-process event bus, handler registry, dead letters
//   application  per-context service facades
//   graphql      schema/resolver composition
//
// ============================================================================

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod events;
pub mod graphql;
pub mod metrics;
pub mod persistence;
pub mod seedwork;
pub mod utils;

pub use bootstrap::Platform;
