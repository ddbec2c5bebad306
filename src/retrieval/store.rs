//! Process-wide corpus/index state published as immutable snapshots

use crate::corpus::Corpus;
use crate::embedding::VectorIndex;
use crate::error::{RagError, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// A corpus and the vector index built from the same passages
///
/// Row `i` of `index` is the embedding of `corpus.get(i)`.
#[derive(Debug)]
pub struct IndexSnapshot {
    corpus: Corpus,
    index: VectorIndex,
    version: u64,
}

impl IndexSnapshot {
    fn new(corpus: Corpus, index: VectorIndex, version: u64) -> Result<Self> {
        if corpus.len() != index.len() {
            return Err(RagError::Validation(format!(
                "Corpus has {} passages but index has {} rows",
                corpus.len(),
                index.len()
            )));
        }
        Ok(Self {
            corpus,
            index,
            version,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Monotonic publish counter, starting at 1
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Summary of the published state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub passages: usize,
    pub documents: usize,
    pub dimension: usize,
    pub version: u64,
}

/// Holder of the current snapshot
///
/// Ingestion builds a complete corpus and index off to the side and calls
/// [`KnowledgeStore::publish`], which swaps one pointer under the write lock.
/// Readers clone the `Arc` and keep a consistent pair for the whole query.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published state with `corpus` and `index` together
    pub fn publish(&self, corpus: Corpus, index: VectorIndex) -> Result<Arc<IndexSnapshot>> {
        let mut current = self
            .current
            .write()
            .map_err(|_| RagError::Other(anyhow!("knowledge store lock poisoned")))?;

        let version = current.as_ref().map_or(1, |s| s.version + 1);
        let snapshot = Arc::new(IndexSnapshot::new(corpus, index, version)?);
        *current = Some(Arc::clone(&snapshot));

        tracing::info!(
            "Published snapshot v{} ({} passages, {}D)",
            version,
            snapshot.corpus.len(),
            snapshot.index.dimension()
        );

        Ok(snapshot)
    }

    /// Drop any published state; later queries fail as not ready
    pub fn clear(&self) -> Result<()> {
        let mut current = self
            .current
            .write()
            .map_err(|_| RagError::Other(anyhow!("knowledge store lock poisoned")))?;
        *current = None;
        Ok(())
    }

    /// Current snapshot, or `NotReady` when nothing searchable is published
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        let current = self
            .current
            .read()
            .map_err(|_| RagError::Other(anyhow!("knowledge store lock poisoned")))?;

        match current.as_ref() {
            Some(snapshot) if !snapshot.corpus.is_empty() && !snapshot.index.is_empty() => {
                Ok(Arc::clone(snapshot))
            }
            _ => Err(RagError::NotReady(
                "Index is empty. Please ingest documents first.".to_string(),
            )),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ok()
    }

    pub fn stats(&self) -> StoreStats {
        match self.snapshot() {
            Ok(snapshot) => StoreStats {
                passages: snapshot.corpus.len(),
                documents: snapshot.corpus.document_count(),
                dimension: snapshot.index.dimension(),
                version: snapshot.version,
            },
            Err(_) => StoreStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;

    fn corpus(n: usize) -> Corpus {
        Corpus::new(
            (0..n)
                .map(|i| Passage::new("https://example.com", "Example", i, format!("passage {i}")))
                .collect(),
        )
    }

    fn index(n: usize) -> VectorIndex {
        let rows: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32, 1.0]).collect();
        VectorIndex::build(&rows).unwrap()
    }

    #[test]
    fn test_empty_store_not_ready() {
        let store = KnowledgeStore::new();
        assert!(matches!(store.snapshot(), Err(RagError::NotReady(_))));
        assert!(!store.is_ready());
        assert_eq!(store.stats(), StoreStats::default());
    }

    #[test]
    fn test_publish_and_read() {
        let store = KnowledgeStore::new();
        store.publish(corpus(3), index(3)).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.corpus().len(), 3);
        assert_eq!(snapshot.index().len(), 3);
        assert_eq!(snapshot.version(), 1);
    }

    #[test]
    fn test_mismatched_publish_rejected() {
        let store = KnowledgeStore::new();
        store.publish(corpus(2), index(2)).unwrap();

        let result = store.publish(corpus(3), index(2));
        assert!(matches!(result, Err(RagError::Validation(_))));

        // Previous state stays authoritative.
        assert_eq!(store.snapshot().unwrap().corpus().len(), 2);
    }

    #[test]
    fn test_old_snapshot_survives_republish() {
        let store = KnowledgeStore::new();
        store.publish(corpus(2), index(2)).unwrap();
        let old = store.snapshot().unwrap();

        store.publish(corpus(5), index(5)).unwrap();
        let new = store.snapshot().unwrap();

        assert_eq!(old.corpus().len(), old.index().len());
        assert_eq!(old.corpus().len(), 2);
        assert_eq!(new.corpus().len(), 5);
        assert_eq!(new.version(), 2);
    }

    #[test]
    fn test_zero_rows_not_ready() {
        let store = KnowledgeStore::new();
        store.publish(Corpus::default(), VectorIndex::default()).unwrap();
        assert!(matches!(store.snapshot(), Err(RagError::NotReady(_))));
    }

    #[test]
    fn test_clear() {
        let store = KnowledgeStore::new();
        store.publish(corpus(1), index(1)).unwrap();
        store.clear().unwrap();
        assert!(!store.is_ready());
    }

    #[test]
    fn test_concurrent_readers_see_consistent_pairs() {
        let store = Arc::new(KnowledgeStore::new());
        store.publish(corpus(1), index(1)).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = store.snapshot().unwrap();
                        assert_eq!(snapshot.corpus().len(), snapshot.index().len());
                    }
                })
            })
            .collect();

        for n in 2..50 {
            store.publish(corpus(n), index(n)).unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
