// ============================================================================
// Seedwork Store - Generic Persistence Contracts
// ============================================================================
//
// Contracts only. Implementations live in src/persistence/
//
// ============================================================================

pub mod repository;
pub mod unit_of_work;

pub use repository::Repository;
pub use unit_of_work::UnitOfWork;
