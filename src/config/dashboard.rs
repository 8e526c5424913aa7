//! Dashboard controller configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Maximum rows sampled per pipeline run
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Profiling debounce window in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Lifetime of the deployment notice in milliseconds
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_ms: u64,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl DashboardConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sample_limit == 0 {
            return Err(ValidationError::InvalidSampleLimit);
        }
        if self.event_capacity == 0 {
            return Err(ValidationError::InvalidEventCapacity);
        }
        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sample_limit: default_sample_limit(),
            debounce_ms: default_debounce(),
            notice_ttl_ms: default_notice_ttl(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_sample_limit() -> usize {
    50
}

fn default_debounce() -> u64 {
    500
}

fn default_notice_ttl() -> u64 {
    3000
}

fn default_event_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.sample_limit, 50);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.notice_ttl(), Duration::from_millis(3000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sample_limit_is_invalid() {
        let config = DashboardConfig {
            sample_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSampleLimit));
    }
}
