//! Retrieval results and the evidence records returned to callers

use crate::corpus::Passage;
use serde::{Deserialize, Serialize};

/// A retrieved passage with its distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub passage: Passage,

    /// Squared Euclidean distance (non-negative, lower is more relevant)
    pub score: f32,
}

impl RetrievalResult {
    pub fn new(passage: Passage, score: f32) -> Self {
        Self { passage, score }
    }

    /// Get a short preview of the text (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        if self.passage.text.chars().count() <= max_chars {
            self.passage.text.clone()
        } else {
            let head: String = self.passage.text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}

/// Source reference returned alongside an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub url: String,
    pub id: String,
    pub score: f32,
}

impl From<&RetrievalResult> for Evidence {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            url: result.passage.source_url.clone(),
            id: result.passage.id.clone(),
            score: result.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_from_result() {
        let passage = Passage::new("https://example.com", "Example", 3, "text".to_string());
        let result = RetrievalResult::new(passage.clone(), 0.25);
        let evidence = Evidence::from(&result);

        assert_eq!(evidence.url, "https://example.com");
        assert_eq!(evidence.id, passage.id);
        assert_eq!(evidence.score, 0.25);
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        let passage = Passage::new("u", "t", 0, "é".repeat(20));
        let result = RetrievalResult::new(passage, 0.0);
        assert_eq!(result.preview(5), format!("{}...", "é".repeat(5)));
        assert_eq!(result.preview(50), "é".repeat(20));
    }
}
