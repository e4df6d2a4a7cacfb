use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::retry::RetryPolicy;

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a friendly restaurant recommendation assistant. \
    Suggest specific dishes, cuisines, and kinds of places to eat based on the user's request. \
    Keep answers short and conversational, and ground recommendations in current information when available.";

/// Main configuration structure for Plateful
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the generative-language endpoint. Empty means
    /// fallback-only mode; no network calls are attempted.
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub system_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_base: f64,
    pub jitter_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                api_key: String::new(),
                model: "gemini-2.0-flash".to_string(),
                request_timeout_secs: 15,
                system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 1000,
                backoff_base: 1.5,
                jitter_ms: 300,
            },
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// ALWAYS returns a valid config - never fails.
    pub fn load() -> Self {
        if dotenvy::dotenv().is_err() {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("PLATEFUL_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        if !config.has_api_key() {
            tracing::warn!("GEMINI_API_KEY not set - running in fallback-only mode");
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Ok(model) = env::var("PLATEFUL_MODEL") {
            self.gemini.model = model;
        }
        if let Ok(timeout) = env::var("PLATEFUL_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.request_timeout_secs = secs;
            }
        }
        if let Ok(attempts) = env::var("PLATEFUL_RETRY_MAX_ATTEMPTS") {
            if let Ok(max) = attempts.parse() {
                self.retry.max_attempts = max;
            }
        }
        if let Ok(delay) = env::var("PLATEFUL_RETRY_BASE_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                self.retry.base_delay_ms = ms;
            }
        }
        if let Ok(jitter) = env::var("PLATEFUL_RETRY_JITTER_MS") {
            if let Ok(ms) = jitter.parse() {
                self.retry.jitter_ms = ms;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.retry.max_attempts == 0 {
            return Err("Retry max_attempts cannot be 0".into());
        }
        if self.retry.backoff_base < 1.0 {
            return Err("Retry backoff_base must be at least 1.0".into());
        }
        if self.gemini.request_timeout_secs == 0 {
            return Err("Request timeout cannot be 0".into());
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini.api_key.is_empty()
    }

    /// Get per-attempt timeout as Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            backoff_base: self.retry.backoff_base,
            jitter: Duration::from_millis(self.retry.jitter_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_retry_contract() {
        let config = Config::default();
        assert!(!config.has_api_key());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.attempt_timeout(), Duration::from_secs(15));

        let policy = config.retry_policy();
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
        assert_eq!(policy.backoff_base, 1.5);
        assert_eq!(policy.jitter, Duration::from_millis(300));
    }

    #[test]
    fn zero_attempts_fails_validation() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
