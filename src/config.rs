use std::env;

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_MODEL: &str = "gemini-flash-latest";
const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key supplied. Set GEMINI_API_KEY (or GOOGLE_API_KEY) before starting a run.")]
    MissingCredential,

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Runtime configuration for one pipeline run. Loaded once in `main` and
/// passed by value into the constructors that need it; nothing below the
/// binary boundary reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the generation backend.
    pub api_key: String,
    /// OpenAI-compatible chat completions endpoint base.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds, applied to both upstreams.
    pub timeout: u64,
    /// Quote endpoint base for the stock price tool.
    pub market_data_base_url: String,
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for everything except the credential.
    pub fn load() -> Result<Self, ConfigError> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .unwrap_or_default();

        Ok(Self {
            api_key,
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            temperature: parse_env("GEMINI_TEMPERATURE", 0.5)?,
            max_tokens: parse_env("GEMINI_MAX_TOKENS", 2048)?,
            timeout: parse_env("REQUEST_TIMEOUT", 60)?,
            market_data_base_url: env_or("MARKET_DATA_BASE_URL", DEFAULT_MARKET_DATA_BASE_URL),
        })
    }

    /// Check the configuration before any network call is attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "GEMINI_BASE_URL".to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }
        if self.market_data_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "MARKET_DATA_BASE_URL".to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api_key: "test-key".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 2048,
            timeout: 60,
            market_data_base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_credential() {
        let mut cfg = test_config();
        cfg.api_key = "   ".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingCredential)));
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let mut cfg = test_config();
        cfg.base_url = String::new();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidValue { .. })));
    }
}
