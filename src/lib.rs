//! finrag - Retrieval-augmented question answering over financial news
//!
//! Ingests exactly three articles, splits them into overlapping passages, embeds
//! and indexes the passages, and answers questions from the nearest passages with
//! an optional generative backend and an extractive fallback.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod splitter;
pub mod synthesis;

pub use error::{RagError, Result};
