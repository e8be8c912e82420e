//! Configuration management for deepscout.
//!
//! Configuration can be set via environment variables:
//! - `ANTHROPIC_API_KEY` - Required. API key for the reasoning model.
//! - `FIRECRAWL_API_KEY` - Required. API key for the search/scrape service.
//! - `DEEPSCOUT_MODEL` - Optional. Model identifier. Defaults to `claude-sonnet-4-5`.
//! - `DEEPSCOUT_MAX_TURNS` - Optional. Maximum agent loop turns. Defaults to `40`.
//! - `DEEPSCOUT_MAX_TOKENS` - Optional. Per-response token budget. Defaults to `16000`.
//! - `DEEPSCOUT_THINKING_BUDGET` - Optional. Interleaved-thinking token budget. Defaults to `10000`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the reasoning-model provider
    pub anthropic_api_key: String,

    /// API key for the search/scrape provider
    pub firecrawl_api_key: String,

    /// Reasoning model identifier
    pub model: String,

    /// Maximum turns for the agent loop before giving up
    pub max_turns: usize,

    /// Token budget per model response
    pub max_tokens: u32,

    /// Token budget for interleaved thinking
    pub thinking_budget: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `ANTHROPIC_API_KEY` or
    /// `FIRECRAWL_API_KEY` is not set. A missing credential is fatal: the
    /// agent loop never starts without both boundaries available.
    pub fn from_env() -> Result<Self, ConfigError> {
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;

        let firecrawl_api_key = std::env::var("FIRECRAWL_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("FIRECRAWL_API_KEY".to_string()))?;

        let model = std::env::var("DEEPSCOUT_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-5".to_string());

        let max_turns = parse_env_var("DEEPSCOUT_MAX_TURNS", 40)?;
        let max_tokens = parse_env_var("DEEPSCOUT_MAX_TOKENS", 16000)?;
        let thinking_budget = parse_env_var("DEEPSCOUT_THINKING_BUDGET", 10000)?;

        Ok(Self {
            anthropic_api_key,
            firecrawl_api_key,
            model,
            max_turns,
            max_tokens,
            thinking_budget,
        })
    }

    /// Create a config with custom keys (useful for testing).
    pub fn new(anthropic_api_key: String, firecrawl_api_key: String) -> Self {
        Self {
            anthropic_api_key,
            firecrawl_api_key,
            model: "claude-sonnet-4-5".to_string(),
            max_turns: 40,
            max_tokens: 16000,
            thinking_budget: 10000,
        }
    }
}

fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_defaults() {
        let config = Config::new("sk-test".to_string(), "fc-test".to_string());

        assert_eq!(config.model, "claude-sonnet-4-5");
        assert_eq!(config.max_turns, 40);
        assert_eq!(config.max_tokens, 16000);
    }
}
