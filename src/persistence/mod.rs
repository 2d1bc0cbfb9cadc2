// ============================================================================
// Persistence - In-Memory Storage Collaborator
// ============================================================================
//
// Implements the seedwork Repository / UnitOfWork contracts on top of an
// in-memory document store, plus the per-context repository traits.
//
// ============================================================================

pub mod document_store;
pub mod repository;
pub mod unit_of_work;

mod community;
mod member;
mod vendor_user;

pub use document_store::{Collection, StoredDocument, UniqueKeys, WriteOp};
pub use repository::{InMemoryRepository, StagedChanges};
pub use unit_of_work::InMemoryUnitOfWork;
