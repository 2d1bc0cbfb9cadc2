use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::seedwork::core::{AggregateRoot, DomainError};
use super::repository::Repository;

/// Coordinates repository operations as a single atomic outcome.
///
/// `with_transaction` runs `work` against a repository bound to one
/// transactional scope, scoped by the caller's passport. The staged
/// mutations commit only if `work` returns `Ok`; otherwise they are
/// discarded and the error is returned unchanged.
#[async_trait]
pub trait UnitOfWork<A: AggregateRoot>: Send + Sync {
    type Repository: Repository<A> + Send;

    async fn with_transaction<T, F>(
        &self,
        passport: &A::Passport,
        work: F,
    ) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'r> FnOnce(&'r mut Self::Repository) -> BoxFuture<'r, Result<T, DomainError>>
            + Send
            + 'static;
}
