use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{CoreError, IndexControl, IndexSpec, VectorIndex, VectorRecord};

#[derive(Debug, Default)]
struct IndexInner {
    dimension: usize,
    records: BTreeMap<String, VectorRecord>,
    upsert_calls: usize,
}

/// In-process index. Clones share storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryIndex {
    inner: Arc<RwLock<IndexInner>>,
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(IndexInner {
                dimension,
                ..IndexInner::default()
            })),
        }
    }

    pub async fn dimension(&self) -> usize {
        self.inner.read().await.dimension
    }

    pub async fn get(&self, id: &str) -> Option<VectorRecord> {
        self.inner.read().await.records.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn upsert_calls(&self) -> usize {
        self.inner.read().await.upsert_calls
    }

    /// Drops a stored vector, simulating remote drift.
    pub async fn remove(&self, id: &str) -> Option<VectorRecord> {
        self.inner.write().await.records.remove(id)
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        inner.upsert_calls += 1;
        for record in records {
            if record.id.trim().is_empty() {
                return Err(CoreError::InvalidId(record.id.clone()));
            }
            if record.values.len() != inner.dimension {
                return Err(CoreError::DimensionMismatch {
                    id: record.id.clone(),
                    expected: inner.dimension,
                    got: record.values.len(),
                });
            }
            inner.records.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.inner.read().await.records.keys().cloned().collect())
    }
}

#[derive(Clone, Default)]
pub struct MemoryControl {
    indexes: Arc<RwLock<HashMap<String, MemoryIndex>>>,
    created: Arc<AtomicUsize>,
}

impl MemoryControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn index(&self, name: &str) -> Option<MemoryIndex> {
        self.indexes.read().await.get(name).cloned()
    }

    /// Number of indexes created through `ensure_index`.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IndexControl for MemoryControl {
    type Index = MemoryIndex;

    async fn ensure_index(&self, spec: &IndexSpec) -> Result<MemoryIndex, CoreError> {
        let mut indexes = self.indexes.write().await;
        if let Some(existing) = indexes.get(&spec.name) {
            return Ok(existing.clone());
        }

        let index = MemoryIndex::new(spec.dimension);
        indexes.insert(spec.name.clone(), index.clone());
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(index)
    }

    async fn open_index(&self, name: &str) -> Result<MemoryIndex, CoreError> {
        self.indexes
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::IndexNotFound(name.to_string()))
    }
}
