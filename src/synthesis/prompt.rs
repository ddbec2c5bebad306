//! Context and prompt construction for grounded generation

use crate::retrieval::RetrievalResult;

/// Exact reply the model must give when the passages lack the answer
pub const NOT_IN_SOURCES: &str = "NOT IN SOURCES";

/// Separator placed between labelled passages in the context block
pub const PASSAGE_DELIMITER: &str = "\n\n---\n\n";

/// Label every passage with its 1-based rank and source, in rank order
pub fn build_context(retrieved: &[RetrievalResult]) -> String {
    retrieved
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "PASSAGE {} (source: {}):\n{}",
                i + 1,
                r.passage.source_url,
                r.passage.text
            )
        })
        .collect::<Vec<_>>()
        .join(PASSAGE_DELIMITER)
}

/// Full grounding prompt sent to the generative backend
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a concise, factual financial assistant. Use ONLY the information in the passages below to answer the question. \
         If the passages do not contain the answer, respond exactly: {NOT_IN_SOURCES}. Provide a short answer (max 200 words), \
         then list supporting passage numbers in square brackets. Do not hallucinate.\n\n\
         CONTEXT:\n{context}\n\nQUESTION: {question}\n\nAnswer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;

    fn result(url: &str, text: &str) -> RetrievalResult {
        RetrievalResult::new(Passage::new(url, "title", 0, text.to_string()), 0.0)
    }

    #[test]
    fn test_context_labels_in_rank_order() {
        let retrieved = vec![
            result("https://a.test", "First passage."),
            result("https://b.test", "Second passage."),
        ];
        let context = build_context(&retrieved);

        assert_eq!(
            context,
            "PASSAGE 1 (source: https://a.test):\nFirst passage.\n\n---\n\nPASSAGE 2 (source: https://b.test):\nSecond passage."
        );
    }

    #[test]
    fn test_prompt_contains_grounding_rules() {
        let prompt = build_prompt("What moved the market?", "PASSAGE 1 (source: u):\ntext");
        assert!(prompt.contains("Use ONLY the information"));
        assert!(prompt.contains("respond exactly: NOT IN SOURCES."));
        assert!(prompt.contains("CONTEXT:\nPASSAGE 1 (source: u):\ntext"));
        assert!(prompt.ends_with("QUESTION: What moved the market?\n\nAnswer:"));
    }
}
