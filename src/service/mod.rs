//! Ingestion and query entry points over one owned knowledge store

use crate::acquisition::{fetch_all, DocumentFetcher};
use crate::config::{Config, LlmConfig};
use crate::corpus::{build_passages, Corpus, Document};
use crate::embedding::{EmbeddingProvider, VectorIndex};
use crate::error::{RagError, Result};
use crate::retrieval::{Evidence, KnowledgeStore, RetrievalResult, Retriever, StoreStats};
use crate::splitter::Splitter;
use crate::synthesis::{AnswerSynthesizer, FallbackPolicy, GeminiBackend, OpenAiBackend};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Every ingestion batch contains exactly this many documents
pub const REQUIRED_DOCUMENTS: usize = 3;

pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_MAX_TOP_K: usize = 20;

/// Answer plus the passages it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub evidence: Vec<Evidence>,
}

/// The retrieval-augmented answering pipeline
///
/// Owns its store, so independent instances never share state.
pub struct RagService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    store: Arc<KnowledgeStore>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    splitter: Splitter,
    default_top_k: usize,
    max_top_k: usize,
    /// Serializes ingestions; queries never take it
    ingest_lock: Mutex<()>,
}

impl RagService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        synthesizer: AnswerSynthesizer,
        splitter: Splitter,
    ) -> Self {
        let store = Arc::new(KnowledgeStore::new());
        let retriever = Retriever::new(Arc::clone(&embedding_provider), Arc::clone(&store));

        Self {
            embedding_provider,
            store,
            retriever,
            synthesizer,
            splitter,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
            ingest_lock: Mutex::new(()),
        }
    }

    /// Build a service from configuration and an already-loaded embedding provider
    pub fn from_config(config: &Config, embedding_provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let splitter = Splitter::new(
            config.splitter.chunk_size,
            config.splitter.overlap,
            config.splitter.min_passage_chars,
        )?;
        let synthesizer = build_synthesizer(&config.llm)?;

        Ok(Self::new(embedding_provider, synthesizer, splitter)
            .with_top_k_limits(config.retrieval.default_top_k, config.retrieval.max_top_k))
    }

    pub fn with_top_k_limits(mut self, default_top_k: usize, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k.max(1);
        self.default_top_k = default_top_k.clamp(1, self.max_top_k);
        self
    }

    /// Split, embed and index exactly three documents, replacing prior state
    ///
    /// Returns the number of passages indexed. Zero passages is not an error:
    /// the store is cleared and later queries report not-ready.
    pub fn ingest(&self, documents: &[Document]) -> Result<usize> {
        if documents.len() != REQUIRED_DOCUMENTS {
            return Err(RagError::Validation(format!(
                "Exactly {} documents are required, got {}",
                REQUIRED_DOCUMENTS,
                documents.len()
            )));
        }

        let _guard = self
            .ingest_lock
            .lock()
            .map_err(|_| RagError::Other(anyhow!("ingestion lock poisoned")))?;
        let start = Instant::now();

        let passages = build_passages(documents, &self.splitter);
        if passages.is_empty() {
            tracing::warn!("Ingestion produced no passages; clearing index");
            self.store.clear()?;
            return Ok(0);
        }

        let corpus = Corpus::new(passages);
        let embeddings = self.embedding_provider.embed_batch(&corpus.texts())?;
        if embeddings.len() != corpus.len() {
            return Err(RagError::Validation(format!(
                "Embedding backend returned {} vectors for {} passages",
                embeddings.len(),
                corpus.len()
            )));
        }

        let index = VectorIndex::build(&embeddings)?;
        let count = corpus.len();
        self.store.publish(corpus, index)?;

        tracing::info!(
            "Indexed {} passages from {} documents in {}ms",
            count,
            documents.len(),
            start.elapsed().as_millis()
        );

        Ok(count)
    }

    /// Fetch three URLs and ingest them; any fetch failure aborts the batch
    pub fn ingest_urls(&self, fetcher: &dyn DocumentFetcher, urls: &[String]) -> Result<usize> {
        if urls.len() != REQUIRED_DOCUMENTS {
            return Err(RagError::Validation(format!(
                "Please provide exactly {} URLs, got {}",
                REQUIRED_DOCUMENTS,
                urls.len()
            )));
        }

        let documents = fetch_all(fetcher, urls)?;
        self.ingest(&documents)
    }

    /// Retrieve passages for `question` without synthesizing an answer
    pub fn retrieve(&self, question: &str, top_k: Option<usize>) -> Result<Vec<RetrievalResult>> {
        let top_k = self.resolve_top_k(top_k)?;
        self.retriever.retrieve(question, top_k)
    }

    /// Answer `question` from the current corpus
    pub fn query(&self, question: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        if question.trim().is_empty() {
            return Err(RagError::Validation("No question provided".to_string()));
        }

        let retrieved = self.retrieve(question, top_k)?;
        let answer = self.synthesizer.answer(question, &retrieved)?;
        let evidence = retrieved.iter().map(Evidence::from).collect();

        Ok(QueryResponse { answer, evidence })
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    fn resolve_top_k(&self, top_k: Option<usize>) -> Result<usize> {
        match top_k {
            None => Ok(self.default_top_k),
            Some(0) => Err(RagError::Validation(
                "top_k must be a positive integer".to_string(),
            )),
            Some(k) => Ok(k.min(self.max_top_k)),
        }
    }
}

/// Pick the generative backend from configuration
///
/// Without an API key (or with generation disabled) the synthesizer is
/// extractive-only.
pub fn build_synthesizer(llm: &LlmConfig) -> Result<AnswerSynthesizer> {
    let Some(api_key) = llm.api_key() else {
        tracing::info!("Generative backend not configured; answers will be extractive");
        return Ok(AnswerSynthesizer::extractive());
    };

    let policy = if llm.fallback_on_error {
        FallbackPolicy::Fallback
    } else {
        FallbackPolicy::Propagate
    };

    let synthesizer = match llm.provider.as_str() {
        "openai" => {
            let mut backend = OpenAiBackend::new(api_key, llm.model.clone(), llm.timeout())?;
            if let Some(base_url) = &llm.base_url {
                backend = backend.with_base_url(base_url.clone());
            }
            AnswerSynthesizer::new(Arc::new(backend), policy)
        }
        "gemini" => {
            let mut backend = GeminiBackend::new(api_key, llm.model.clone(), llm.timeout())?;
            if let Some(base_url) = &llm.base_url {
                backend = backend.with_base_url(base_url.clone());
            }
            AnswerSynthesizer::new(Arc::new(backend), policy)
        }
        other => {
            return Err(RagError::Config(format!(
                "Unsupported llm provider '{}'; use openai or gemini",
                other
            )))
        }
    };

    tracing::info!("Using {} model {} for answers", llm.provider, llm.model);

    Ok(synthesizer.with_decoding(llm.temperature, llm.max_tokens))
}
