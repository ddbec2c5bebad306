//! Sentence-aware passage splitter
//!
//! Turns raw document text into overlapping passages of roughly `chunk_size`
//! characters. Windows that do not reach the end of the text are pulled back to
//! the last sentence-terminating period when one exists far enough into the
//! window, so passages tend to end on sentence boundaries.

use crate::error::{RagError, Result};
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Default window size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 900;
/// Default overlap between consecutive windows
pub const DEFAULT_OVERLAP: usize = 150;
/// Passages shorter than this (after trimming) are dropped as noise
pub const MIN_PASSAGE_CHARS: usize = 50;

/// Deterministic passage splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splitter {
    chunk_size: usize,
    overlap: usize,
    min_chars: usize,
}

impl Splitter {
    /// Create a splitter, rejecting `overlap >= chunk_size`
    pub fn new(chunk_size: usize, overlap: usize, min_chars: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Validation(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::Validation(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
            min_chars,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered passages
    pub fn split(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = normalized.chars().collect();
        let len = chars.len();
        let mut passages = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = (start + self.chunk_size).min(len);

            if end < len {
                if let Some(pos) = chars[start..end].iter().rposition(|c| *c == '.') {
                    if pos > self.chunk_size / 4 {
                        end = start + pos + 1;
                    }
                }
            }

            let passage: String = chars[start..end].iter().collect();
            let passage = passage.trim();
            if passage.chars().count() >= self.min_chars {
                passages.push(passage.to_string());
            }

            if end >= len {
                break;
            }

            // Step back by the overlap but always make progress.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        passages
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            min_chars: MIN_PASSAGE_CHARS,
        }
    }
}

/// Split `text` with the default minimum passage length
pub fn split_into_passages(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(Splitter::new(chunk_size, overlap, MIN_PASSAGE_CHARS)?.split(text))
}

/// Collapse every whitespace run to a single space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
