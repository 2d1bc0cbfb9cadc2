use async_trait::async_trait;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::seedwork::{AggregateCore, AggregateRoot, DomainError, DomainEvent, Repository};
use super::document_store::{Collection, StoredDocument, WriteOp};

// ============================================================================
// In-Memory Repository - One Transactional Scope
// ============================================================================
//
// Reads see committed documents overlaid with this scope's own staged
// writes. Nothing reaches the collection until the unit of work commits.
//
// ============================================================================

#[derive(Debug, Clone)]
enum Staged<P> {
    /// `expected_version` is `None` for an aggregate that was never stored.
    Upsert { expected_version: Option<u64>, props: P },
    Delete { expected_version: u64 },
}

/// Mutations and events staged by one repository, ready to commit.
pub struct StagedChanges<A: AggregateRoot> {
    pub writes: Vec<WriteOp<A::Props>>,
    pub events: Vec<A::Event>,
}

pub struct InMemoryRepository<A: AggregateRoot> {
    collection: Collection<A::Props>,
    passport: A::Passport,
    staged: BTreeMap<Uuid, Staged<A::Props>>,
    pending_events: Vec<A::Event>,
}

impl<A: AggregateRoot> InMemoryRepository<A> {
    pub fn new(collection: Collection<A::Props>, passport: A::Passport) -> Self {
        Self {
            collection,
            passport,
            staged: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    /// The passport this scope was opened with.
    pub fn passport(&self) -> &A::Passport {
        &self.passport
    }

    fn load(&self, id: Uuid, doc: StoredDocument<A::Props>) -> A {
        A::from_core(AggregateCore::rehydrate(
            id,
            doc.version,
            doc.props,
            self.passport.clone(),
        ))
    }

    fn materialize(&self, id: Uuid, staged: &Staged<A::Props>) -> Option<A> {
        match staged {
            Staged::Upsert {
                expected_version: None,
                props,
            } => Some(A::from_core(AggregateCore::new(
                id,
                props.clone(),
                self.passport.clone(),
            ))),
            Staged::Upsert {
                expected_version: Some(version),
                props,
            } => Some(A::from_core(AggregateCore::rehydrate(
                id,
                *version,
                props.clone(),
                self.passport.clone(),
            ))),
            Staged::Delete { .. } => None,
        }
    }

    /// Every visible aggregate whose props match `predicate`, in id order.
    pub async fn find_all<F>(&self, predicate: F) -> Vec<A>
    where
        F: Fn(&A::Props) -> bool + Send + Sync,
    {
        let mut found = BTreeMap::new();

        for (id, doc) in self.collection.scan(&predicate).await {
            if !self.staged.contains_key(&id) {
                found.insert(id, self.load(id, doc));
            }
        }
        for (id, staged) in &self.staged {
            if let Some(aggregate) = self.materialize(*id, staged) {
                if predicate(aggregate.props()) {
                    found.insert(*id, aggregate);
                }
            }
        }

        found.into_values().collect()
    }

    pub async fn find_one<F>(&self, predicate: F) -> Option<A>
    where
        F: Fn(&A::Props) -> bool + Send + Sync,
    {
        self.find_all(predicate).await.into_iter().next()
    }

    /// Hand the staged writes and collected events to the unit of work.
    pub fn into_changes(self) -> StagedChanges<A> {
        let writes = self
            .staged
            .into_iter()
            .map(|(id, staged)| match staged {
                Staged::Upsert {
                    expected_version: None,
                    props,
                } => WriteOp::Insert { id, props },
                Staged::Upsert {
                    expected_version: Some(expected_version),
                    props,
                } => WriteOp::Update {
                    id,
                    expected_version,
                    props,
                },
                Staged::Delete { expected_version } => WriteOp::Delete {
                    id,
                    expected_version,
                },
            })
            .collect();

        StagedChanges {
            writes,
            events: self.pending_events,
        }
    }
}

#[async_trait]
impl<A: AggregateRoot> Repository<A> for InMemoryRepository<A> {
    async fn get(&self, id: Uuid) -> Result<A, DomainError> {
        if let Some(staged) = self.staged.get(&id) {
            return self
                .materialize(id, staged)
                .ok_or_else(|| DomainError::not_found(A::NAME, id));
        }

        self.collection
            .get(id)
            .await
            .map(|doc| self.load(id, doc))
            .ok_or_else(|| DomainError::not_found(A::NAME, id))
    }

    async fn save(&mut self, aggregate: &mut A) -> Result<(), DomainError> {
        let id = aggregate.id();
        let expected_version = match self.staged.get(&id) {
            Some(Staged::Delete { .. }) => {
                return Err(DomainError::conflict(format!(
                    "{} {} was deleted in this transaction",
                    A::NAME,
                    id
                )));
            }
            // Keep the expectation from the first save in this scope.
            Some(Staged::Upsert { expected_version, .. }) => *expected_version,
            None if aggregate.is_new() => None,
            None => Some(aggregate.version()),
        };

        self.staged.insert(
            id,
            Staged::Upsert {
                expected_version,
                props: aggregate.props().clone(),
            },
        );
        self.pending_events.extend(aggregate.take_domain_events());

        tracing::debug!(aggregate = A::NAME, id = %id, "Staged save");
        Ok(())
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), DomainError> {
        match self.staged.get(&id).cloned() {
            Some(Staged::Delete { .. }) => return Err(DomainError::not_found(A::NAME, id)),
            Some(Staged::Upsert {
                expected_version: None,
                ..
            }) => {
                // Never stored: forget it entirely.
                self.staged.remove(&id);
            }
            Some(Staged::Upsert {
                expected_version: Some(expected_version),
                ..
            }) => {
                self.staged.insert(id, Staged::Delete { expected_version });
            }
            None => {
                let doc = self
                    .collection
                    .get(id)
                    .await
                    .ok_or_else(|| DomainError::not_found(A::NAME, id))?;
                self.staged.insert(
                    id,
                    Staged::Delete {
                        expected_version: doc.version,
                    },
                );
            }
        }
        // A deleted aggregate announces none of the changes staged before.
        self.pending_events.retain(|event| event.aggregate_id() != id);

        tracing::debug!(aggregate = A::NAME, id = %id, "Staged delete");
        Ok(())
    }
}
