/// Embedding & Indexing
///
/// Local embedding generation and exact vector search.
/// - EmbeddingProvider trait for abstraction over backends
/// - FastEmbedProvider for local embedding (all-MiniLM-L6-v2, 384-dim)
/// - VectorIndex: flat squared-L2 index rebuilt per ingestion batch
mod provider;
mod vector_index;

pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
pub use vector_index::{SearchResult, VectorIndex, VectorIndexError};
