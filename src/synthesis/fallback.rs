//! Deterministic extractive answer used when generation is unavailable

use crate::retrieval::RetrievalResult;

/// Maximum characters of passage text kept in the extractive answer
pub const EXTRACT_CHARS: usize = 1200;

/// Concatenate passages in rank order, keep a bounded prefix, cite ranks 1..N
pub fn extractive_answer(retrieved: &[RetrievalResult]) -> String {
    let combined = retrieved
        .iter()
        .map(|r| r.passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let snippet: String = combined.trim().chars().take(EXTRACT_CHARS).collect();
    let citations = (1..=retrieved.len())
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{}\n\nSupporting passages: [{}]",
        snippet.trim_end(),
        citations
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;

    fn results(texts: &[&str]) -> Vec<RetrievalResult> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                RetrievalResult::new(Passage::new("https://a.test", "A", i, t.to_string()), i as f32)
            })
            .collect()
    }

    #[test]
    fn test_citation_suffix() {
        let answer = extractive_answer(&results(&["one", "two", "three"]));
        assert!(answer.ends_with("Supporting passages: [1,2,3]"));
        assert_eq!(answer, "one\n\ntwo\n\nthree\n\nSupporting passages: [1,2,3]");
    }

    #[test]
    fn test_single_passage() {
        let answer = extractive_answer(&results(&["Only passage."]));
        assert_eq!(answer, "Only passage.\n\nSupporting passages: [1]");
    }

    #[test]
    fn test_snippet_truncated() {
        let long = "x".repeat(2000);
        let answer = extractive_answer(&results(&[&long, "tail"]));
        let snippet = answer.split("\n\nSupporting passages:").next().unwrap();
        assert_eq!(snippet.chars().count(), EXTRACT_CHARS);
        assert!(answer.ends_with("[1,2]"));
    }

    #[test]
    fn test_trailing_whitespace_trimmed_after_cut() {
        let text = format!("{} tail", "y".repeat(EXTRACT_CHARS - 1));
        let answer = extractive_answer(&results(&[&text]));
        assert!(answer.starts_with(&"y".repeat(EXTRACT_CHARS - 1)));
        assert!(answer.contains(&format!("{}\n\nSupporting", "y".repeat(EXTRACT_CHARS - 1))));
    }

    #[test]
    fn test_no_passages() {
        assert_eq!(extractive_answer(&[]), "\n\nSupporting passages: []");
    }
}
