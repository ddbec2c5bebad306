//! Grounded answer synthesis with deterministic fallback

use crate::error::{RagError, Result};
use crate::retrieval::RetrievalResult;
use crate::synthesis::{
    build_context, build_prompt, extractive_answer, GenerationOutcome, GenerationRequest,
    GenerativeBackend,
};
use std::sync::Arc;

/// What to do when the generative backend fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Log the failure and answer extractively
    #[default]
    Fallback,
    /// Surface the failure as `RagError::Generation`
    Propagate,
}

/// Produces an answer from a question and its retrieved passages
pub struct AnswerSynthesizer {
    backend: Option<Arc<dyn GenerativeBackend>>,
    policy: FallbackPolicy,
    temperature: f32,
    max_tokens: usize,
}

impl AnswerSynthesizer {
    /// Synthesizer that always answers extractively
    pub fn extractive() -> Self {
        Self {
            backend: None,
            policy: FallbackPolicy::Fallback,
            temperature: 0.0,
            max_tokens: 400,
        }
    }

    pub fn new(backend: Arc<dyn GenerativeBackend>, policy: FallbackPolicy) -> Self {
        Self {
            backend: Some(backend),
            policy,
            ..Self::extractive()
        }
    }

    pub fn with_decoding(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Answer `question` from `retrieved` only
    pub fn answer(&self, question: &str, retrieved: &[RetrievalResult]) -> Result<String> {
        let Some(backend) = &self.backend else {
            tracing::debug!("No generative backend configured, answering extractively");
            return Ok(extractive_answer(retrieved));
        };

        let context = build_context(retrieved);
        let prompt = build_prompt(question, &context);
        let request = GenerationRequest {
            prompt: &prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        match backend.complete(&request) {
            GenerationOutcome::Answer(text) => Ok(text.trim().to_string()),
            GenerationOutcome::BackendUnavailable(reason) => match self.policy {
                FallbackPolicy::Fallback => {
                    tracing::warn!(
                        "{} generation failed, using extractive answer: {}",
                        backend.name(),
                        reason
                    );
                    Ok(extractive_answer(retrieved))
                }
                FallbackPolicy::Propagate => Err(RagError::Generation(format!(
                    "{}: {}",
                    backend.name(),
                    reason
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;
    use std::sync::Mutex;

    struct ScriptedBackend {
        outcome: GenerationOutcome,
        prompts: Mutex<Vec<(String, f32, usize)>>,
    }

    impl ScriptedBackend {
        fn new(outcome: GenerationOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl GenerativeBackend for ScriptedBackend {
        fn complete(&self, request: &GenerationRequest) -> GenerationOutcome {
            self.prompts.lock().unwrap().push((
                request.prompt.to_string(),
                request.temperature,
                request.max_tokens,
            ));
            self.outcome.clone()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn retrieved() -> Vec<RetrievalResult> {
        vec![
            RetrievalResult::new(
                Passage::new("https://a.test", "A", 0, "Inflation slowed to 3%.".to_string()),
                0.1,
            ),
            RetrievalResult::new(
                Passage::new("https://b.test", "B", 0, "Rates were held.".to_string()),
                0.4,
            ),
        ]
    }

    #[test]
    fn test_extractive_without_backend() {
        let synthesizer = AnswerSynthesizer::extractive();
        let answer = synthesizer.answer("What happened?", &retrieved()).unwrap();
        assert!(answer.ends_with("Supporting passages: [1,2]"));
        assert!(!synthesizer.has_backend());
    }

    #[test]
    fn test_generated_answer_trimmed() {
        let backend = ScriptedBackend::new(GenerationOutcome::Answer(
            "  Inflation slowed to 3%. [1]\n".to_string(),
        ));
        let synthesizer = AnswerSynthesizer::new(backend.clone(), FallbackPolicy::Fallback);

        let answer = synthesizer.answer("What happened?", &retrieved()).unwrap();
        assert_eq!(answer, "Inflation slowed to 3%. [1]");

        let prompts = backend.prompts.lock().unwrap();
        let (prompt, temperature, max_tokens) = &prompts[0];
        assert!(prompt.contains("PASSAGE 1 (source: https://a.test):\nInflation slowed to 3%."));
        assert!(prompt.contains("PASSAGE 2 (source: https://b.test):\nRates were held."));
        assert!(prompt.contains("QUESTION: What happened?"));
        assert_eq!(*temperature, 0.0);
        assert_eq!(*max_tokens, 400);
    }

    #[test]
    fn test_sentinel_passed_through() {
        let backend = ScriptedBackend::new(GenerationOutcome::Answer("NOT IN SOURCES".to_string()));
        let synthesizer = AnswerSynthesizer::new(backend, FallbackPolicy::Fallback);
        assert_eq!(
            synthesizer.answer("Who won?", &retrieved()).unwrap(),
            "NOT IN SOURCES"
        );
    }

    #[test]
    fn test_failure_falls_back() {
        let backend =
            ScriptedBackend::new(GenerationOutcome::BackendUnavailable("timeout".to_string()));
        let synthesizer = AnswerSynthesizer::new(backend, FallbackPolicy::Fallback);

        let answer = synthesizer.answer("What happened?", &retrieved()).unwrap();
        assert_eq!(
            answer,
            "Inflation slowed to 3%.\n\nRates were held.\n\nSupporting passages: [1,2]"
        );
    }

    #[test]
    fn test_failure_propagates() {
        let backend =
            ScriptedBackend::new(GenerationOutcome::BackendUnavailable("timeout".to_string()));
        let synthesizer = AnswerSynthesizer::new(backend, FallbackPolicy::Propagate);

        let result = synthesizer.answer("What happened?", &retrieved());
        assert!(matches!(result, Err(RagError::Generation(msg)) if msg.contains("timeout")));
    }

    #[test]
    fn test_inputs_not_modified() {
        let synthesizer = AnswerSynthesizer::extractive();
        let input = retrieved();
        let before = input.clone();
        synthesizer.answer("q", &input).unwrap();
        assert_eq!(input, before);
    }
}
