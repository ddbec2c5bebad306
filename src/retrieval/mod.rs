//! Retrieval
//!
//! Snapshot-based corpus/index state and the query-time retriever that turns
//! a question into the nearest passages.

mod provenance;
mod retriever;
mod store;

pub use provenance::{Evidence, RetrievalResult};
pub use retriever::Retriever;
pub use store::{IndexSnapshot, KnowledgeStore, StoreStats};
