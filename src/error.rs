use crate::embedding::{EmbeddingError, VectorIndexError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for finrag
#[derive(Error, Debug)]
pub enum RagError {
    /// Malformed caller input (document count, empty question, bad shapes)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query issued before a successful ingestion
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Embedding backend failures
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Generative backend failures (only surfaced when fallback is disabled)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Document fetch failures
    #[error("Failed to acquire {url}: {message}")]
    Acquisition { url: String, message: String },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<VectorIndexError> for RagError {
    fn from(err: VectorIndexError) -> Self {
        match err {
            VectorIndexError::Empty => RagError::NotReady(err.to_string()),
            other => RagError::Validation(other.to_string()),
        }
    }
}

impl RagError {
    /// Whether the error was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, RagError::Validation(_) | RagError::NotReady(_))
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for finrag operations
pub type Result<T> = std::result::Result<T, RagError>;
