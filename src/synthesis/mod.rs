//! Answer Synthesis
//!
//! Builds a grounding prompt from retrieved passages and asks a generative
//! backend for an answer. Without a backend, or when the backend fails and the
//! policy allows it, a deterministic extractive answer is returned instead.

mod fallback;
mod prompt;
mod providers;
mod synthesizer;

pub use fallback::{extractive_answer, EXTRACT_CHARS};
pub use prompt::{build_context, build_prompt, NOT_IN_SOURCES, PASSAGE_DELIMITER};
pub use providers::{
    GeminiBackend, GenerationOutcome, GenerationRequest, GenerativeBackend, OpenAiBackend,
};
pub use synthesizer::{AnswerSynthesizer, FallbackPolicy};
