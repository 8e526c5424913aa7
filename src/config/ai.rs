//! AI provider configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key; only needed by commands that call the model
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first rate-limited attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles for each later one
    #[serde(default = "default_backoff")]
    pub base_backoff_ms: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    /// The API key, or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&Secret<String>, ValidationError> {
        self.api_key
            .as_ref()
            .ok_or(ValidationError::MissingRequired("RETAIL_DNA__AI__API_KEY"))
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("RETAIL_DNA__AI__MODEL"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.base_backoff_ms == 0 {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            base_backoff_ms: default_backoff(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_backoff() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_backoff(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let config = AiConfig::default();
        assert_eq!(
            config.require_api_key().unwrap_err(),
            ValidationError::MissingRequired("RETAIL_DNA__AI__API_KEY")
        );
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = AiConfig {
            api_key: Some(Secret::new("AIza-secret".to_string())),
            ..Default::default()
        };
        assert_eq!(config.require_api_key().unwrap().expose_secret(), "AIza-secret");
        assert!(!format!("{:?}", config).contains("AIza-secret"));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn test_zero_backoff_is_invalid() {
        let config = AiConfig {
            base_backoff_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBackoff));
    }
}
