//! Query-time nearest-passage lookup

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retrieval::{KnowledgeStore, RetrievalResult};
use std::sync::Arc;

/// Embeds queries and resolves index hits to corpus passages
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    store: Arc<KnowledgeStore>,
}

impl Retriever {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, store: Arc<KnowledgeStore>) -> Self {
        Self {
            embedding_provider,
            store,
        }
    }

    /// Return up to `top_k` passages ordered by ascending distance
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        if query.trim().is_empty() {
            return Err(RagError::Validation(
                "Query text cannot be empty".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(RagError::Validation(
                "top_k must be greater than 0".to_string(),
            ));
        }

        // Pin one snapshot for the whole lookup.
        let snapshot = self.store.snapshot()?;

        let query_embedding = self.embedding_provider.embed(query)?;
        let hits = snapshot.index().search(&query_embedding, top_k)?;

        let corpus = snapshot.corpus();
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            match corpus.get(hit.row) {
                Ok(passage) => results.push(RetrievalResult::new(passage.clone(), hit.distance)),
                Err(e) => tracing::warn!("Skipping index row {}: {}", hit.row, e),
            }
        }

        tracing::debug!(
            "Retrieved {} passages for query from snapshot v{}",
            results.len(),
            snapshot.version()
        );

        Ok(results)
    }

    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }
}
