//! Passage records and the ordered corpus aligned with the vector index

use crate::error::{RagError, Result};
use crate::splitter::Splitter;
use serde::{Deserialize, Serialize};

/// A fetched source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub text: String,
}

impl Document {
    pub fn new(url: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// The unit of retrieval: an immutable excerpt of one source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// BLAKE3 hex digest of `"{source_url}||{sequence_index}"`
    pub id: String,
    pub source_url: String,
    pub title: String,
    pub text: String,
}

impl Passage {
    pub fn new(source_url: &str, title: &str, sequence_index: usize, text: String) -> Self {
        Self {
            id: passage_id(source_url, sequence_index),
            source_url: source_url.to_string(),
            title: title.to_string(),
            text,
        }
    }
}

/// Stable passage identifier for a (url, index) pair
pub fn passage_id(source_url: &str, sequence_index: usize) -> String {
    blake3::hash(format!("{}||{}", source_url, sequence_index).as_bytes())
        .to_hex()
        .to_string()
}

/// Split every document and number its passages from zero
pub fn build_passages(documents: &[Document], splitter: &Splitter) -> Vec<Passage> {
    documents
        .iter()
        .flat_map(|doc| {
            splitter
                .split(&doc.text)
                .into_iter()
                .enumerate()
                .map(move |(i, text)| Passage::new(&doc.url, &doc.title, i, text))
        })
        .collect()
}

/// Ordered passages; position `i` corresponds to row `i` of the vector index
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    passages: Vec<Passage>,
}

impl Corpus {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    /// Swap in a new ordered set of passages
    pub fn replace(&mut self, passages: Vec<Passage>) {
        self.passages = passages;
    }

    /// Bounds-checked lookup by row index
    pub fn get(&self, row: usize) -> Result<&Passage> {
        self.passages.get(row).ok_or_else(|| {
            RagError::Validation(format!(
                "Row {} is outside the corpus (len {})",
                row,
                self.passages.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passage> {
        self.passages.iter()
    }

    /// Passage texts in row order, ready for embedding
    pub fn texts(&self) -> Vec<String> {
        self.passages.iter().map(|p| p.text.clone()).collect()
    }

    /// Number of distinct source URLs
    pub fn document_count(&self) -> usize {
        let mut urls: Vec<&str> = self.passages.iter().map(|p| p.source_url.as_str()).collect();
        urls.sort_unstable();
        urls.dedup();
        urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_id_is_stable() {
        let a = passage_id("https://example.com/a", 0);
        let b = passage_id("https://example.com/a", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_passage_id_varies() {
        let base = passage_id("https://example.com/a", 0);
        assert_ne!(base, passage_id("https://example.com/a", 1));
        assert_ne!(base, passage_id("https://example.com/b", 0));
    }

    #[test]
    fn test_build_passages_numbers_per_document() {
        let body = "Quarterly revenue rose on stronger demand for cloud services overall.";
        let docs = vec![
            Document::new("https://a.test", "A", body),
            Document::new("https://b.test", "B", body),
        ];
        let passages = build_passages(&docs, &Splitter::default());

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].id, passage_id("https://a.test", 0));
        assert_eq!(passages[1].id, passage_id("https://b.test", 0));
        assert_eq!(passages[1].title, "B");
    }

    #[test]
    fn test_corpus_get_bounds() {
        let corpus = Corpus::new(vec![Passage::new("u", "t", 0, "text".to_string())]);
        assert_eq!(corpus.get(0).unwrap().source_url, "u");
        assert!(corpus.get(1).is_err());
    }

    #[test]
    fn test_corpus_replace() {
        let mut corpus = Corpus::default();
        assert!(corpus.is_empty());

        corpus.replace(vec![
            Passage::new("u1", "t", 0, "one".to_string()),
            Passage::new("u1", "t", 1, "two".to_string()),
            Passage::new("u2", "t", 0, "three".to_string()),
        ]);
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.document_count(), 2);
        assert_eq!(corpus.texts(), vec!["one", "two", "three"]);
    }
}
