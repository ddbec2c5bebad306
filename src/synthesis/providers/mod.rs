//! Generative model backends used for grounded answers

mod gemini;
mod openai;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

/// Request envelope shared by the various backends.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Result of a generation attempt
///
/// Backend failures are data, not panics or early returns: the synthesizer
/// inspects the outcome and decides whether to fall back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Answer(String),
    BackendUnavailable(String),
}

impl GenerationOutcome {
    /// Convert a provider call into an outcome, treating blank text as a failure
    pub fn from_result(result: anyhow::Result<String>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => {
                Self::BackendUnavailable("model returned an empty response".to_string())
            }
            Ok(text) => Self::Answer(text),
            Err(e) => Self::BackendUnavailable(format!("{:#}", e)),
        }
    }
}

/// Trait implemented by concrete generative backends.
pub trait GenerativeBackend: Send + Sync {
    fn complete(&self, request: &GenerationRequest) -> GenerationOutcome;

    /// Human-readable backend name for logs
    fn name(&self) -> &str;
}
