use crate::config::Config;
use crate::error::{RagError, Result, ValidationError};

const SUPPORTED_PROVIDERS: [&str; 2] = ["openai", "gemini"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every problem at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_splitter(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_fetch(config, &mut errors);
        Self::validate_server(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RagError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_splitter(config: &Config, errors: &mut Vec<ValidationError>) {
        let splitter = &config.splitter;
        if splitter.chunk_size == 0 {
            errors.push(ValidationError::new(
                "splitter.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if splitter.overlap >= splitter.chunk_size {
            errors.push(ValidationError::new(
                "splitter.overlap",
                format!(
                    "Overlap ({}) must be smaller than chunk size ({})",
                    splitter.overlap, splitter.chunk_size
                ),
            ));
        }

        if splitter.min_passage_chars == 0 {
            errors.push(ValidationError::new(
                "splitter.min_passage_chars",
                "Minimum passage length must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let retrieval = &config.retrieval;
        if retrieval.max_top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.max_top_k",
                "max_top_k must be greater than 0",
            ));
        }

        if retrieval.default_top_k == 0 || retrieval.default_top_k > retrieval.max_top_k {
            errors.push(ValidationError::new(
                "retrieval.default_top_k",
                format!(
                    "default_top_k must be between 1 and {}, got {}",
                    retrieval.max_top_k, retrieval.default_top_k
                ),
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        // A missing API key is not an error: generation is skipped and answers
        // are extractive.
        let temp = config.llm.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        let provider = &config.llm.provider;
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            errors.push(ValidationError::new(
                "llm.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    SUPPORTED_PROVIDERS, provider
                ),
            ));
        }

        if config.llm.model.is_empty() {
            errors.push(ValidationError::new("llm.model", "Model name cannot be empty"));
        }

        if config.llm.max_tokens == 0 {
            errors.push(ValidationError::new(
                "llm.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_fetch(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.fetch.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "fetch.timeout_secs",
                "Fetch timeout must be greater than 0",
            ));
        }
    }

    fn validate_server(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.server.bind.trim().is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "Bind address cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(config: &Config) -> Vec<String> {
        match ConfigValidator::validate(config) {
            Err(RagError::ConfigValidation { errors }) => {
                errors.into_iter().map(|e| e.path).collect()
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        let mut config = Config::default();
        config.splitter.overlap = 900;
        assert_eq!(errors_for(&config), vec!["splitter.overlap"]);
    }

    #[test]
    fn test_invalid_provider() {
        let mut config = Config::default();
        config.llm.provider = "invalid".to_string();
        assert_eq!(errors_for(&config), vec!["llm.provider"]);
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut config = Config::default();
        config.retrieval.default_top_k = 0;
        config.llm.temperature = 3.0;
        config.server.bind = String::new();

        let errors = errors_for(&config);
        assert_eq!(
            errors,
            vec!["retrieval.default_top_k", "llm.temperature", "server.bind"]
        );
    }
}
