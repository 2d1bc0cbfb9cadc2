use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::seedwork::DomainError;

// ============================================================================
// In-Memory Document Store
// ============================================================================
//
// One collection per aggregate type, keyed by aggregate id. Every document
// carries a version used for optimistic concurrency:
// - insert   -> version 1, fails if the id already exists
// - update   -> version + 1, fails unless the stored version is the expected one
// - delete   -> fails unless the stored version is the expected one
//
// A commit verifies every write before applying any of them, all under the
// collection's write lock, so a batch is applied completely or not at all.
// Verification also covers unique keys: after the batch no two documents
// may report the same key.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument<P> {
    pub version: u64,
    pub props: P,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp<P> {
    Insert { id: Uuid, props: P },
    Update { id: Uuid, expected_version: u64, props: P },
    Delete { id: Uuid, expected_version: u64 },
}

impl<P> WriteOp<P> {
    pub fn id(&self) -> Uuid {
        match self {
            WriteOp::Insert { id, .. } | WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => *id,
        }
    }
}

/// Extracts the unique keys of a document.
pub type UniqueKeys<P> = fn(&P) -> Vec<String>;

pub struct Collection<P> {
    name: &'static str,
    documents: Arc<RwLock<BTreeMap<Uuid, StoredDocument<P>>>>,
    unique_keys: Option<UniqueKeys<P>>,
}

impl<P> Clone for Collection<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            documents: Arc::clone(&self.documents),
            unique_keys: self.unique_keys,
        }
    }
}

impl<P: Clone + Send + Sync> Collection<P> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            documents: Arc::new(RwLock::new(BTreeMap::new())),
            unique_keys: None,
        }
    }

    pub fn with_unique_keys(mut self, unique_keys: UniqueKeys<P>) -> Self {
        self.unique_keys = Some(unique_keys);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get(&self, id: Uuid) -> Option<StoredDocument<P>> {
        self.documents.read().await.get(&id).cloned()
    }

    /// Documents whose props match `predicate`, in id order.
    pub async fn scan<F>(&self, predicate: F) -> Vec<(Uuid, StoredDocument<P>)>
    where
        F: Fn(&P) -> bool,
    {
        self.documents
            .read()
            .await
            .iter()
            .filter(|(_, doc)| predicate(&doc.props))
            .map(|(id, doc)| (*id, doc.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Apply `writes` atomically, returning the resulting version per id.
    pub async fn commit(&self, writes: Vec<WriteOp<P>>) -> Result<HashMap<Uuid, u64>, DomainError> {
        let mut documents = self.documents.write().await;

        // Verify everything first: nothing is applied if any write conflicts.
        for write in &writes {
            let current = documents.get(&write.id()).map(|doc| doc.version);
            match (write, current) {
                (WriteOp::Insert { id, .. }, Some(_)) => {
                    return Err(DomainError::conflict(format!(
                        "{} {} already exists",
                        self.name, id
                    )));
                }
                (WriteOp::Insert { .. }, None) => {}
                (
                    WriteOp::Update { id, expected_version, .. }
                    | WriteOp::Delete { id, expected_version },
                    current,
                ) => {
                    if current != Some(*expected_version) {
                        return Err(DomainError::conflict(format!(
                            "{} {}: expected version {}, found {}",
                            self.name,
                            id,
                            expected_version,
                            current.map_or_else(|| "none".to_string(), |v| v.to_string())
                        )));
                    }
                }
            }
        }
        if let Some(unique_keys) = self.unique_keys {
            self.check_unique_keys(&documents, &writes, unique_keys)?;
        }

        let mut versions = HashMap::with_capacity(writes.len());
        for write in writes {
            match write {
                WriteOp::Insert { id, props } => {
                    documents.insert(id, StoredDocument { version: 1, props });
                    versions.insert(id, 1);
                }
                WriteOp::Update { id, expected_version, props } => {
                    let version = expected_version + 1;
                    documents.insert(id, StoredDocument { version, props });
                    versions.insert(id, version);
                }
                WriteOp::Delete { id, expected_version } => {
                    documents.remove(&id);
                    versions.insert(id, expected_version + 1);
                }
            }
        }

        tracing::debug!(
            collection = self.name,
            writes = versions.len(),
            "Committed batch"
        );

        Ok(versions)
    }

    fn check_unique_keys(
        &self,
        documents: &BTreeMap<Uuid, StoredDocument<P>>,
        writes: &[WriteOp<P>],
        unique_keys: UniqueKeys<P>,
    ) -> Result<(), DomainError> {
        let written: HashSet<Uuid> = writes.iter().map(WriteOp::id).collect();
        let mut owners: HashMap<String, Uuid> = documents
            .iter()
            .filter(|(id, _)| !written.contains(id))
            .flat_map(|(id, doc)| unique_keys(&doc.props).into_iter().map(move |key| (key, *id)))
            .collect();

        for write in writes {
            let (id, props) = match write {
                WriteOp::Insert { id, props } | WriteOp::Update { id, props, .. } => (*id, props),
                WriteOp::Delete { .. } => continue,
            };
            for key in unique_keys(props) {
                match owners.get(&key) {
                    Some(owner) if *owner != id => {
                        return Err(DomainError::conflict(format!(
                            "{} {}: {} is already taken by {}",
                            self.name, id, key, owner
                        )));
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(key, id);
                    }
                }
            }
        }
        Ok(())
    }
}
