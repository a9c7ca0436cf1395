//! Configuration for the failover pool and per-call acquisition settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Constructor-level failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Number of outer retry passes over the full ordered replica list per
    /// acquisition attempt
    pub max_tries: usize,
    /// Error counters are halved once per elapsed period
    pub decrease_error_period: Duration,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            max_tries: 3,
            decrease_error_period: Duration::from_secs(120),
        }
    }
}

impl FailoverConfig {
    /// Validate the configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.decrease_error_period.is_zero() {
            return Err("Decrease error period must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Per-call acquisition settings
///
/// Callers without specific requirements pass `AcquireSettings::default()`:
/// one connection, total failure is fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireSettings {
    /// Upper bound on the number of handles `acquire_many` returns
    pub max_parallel_replicas: usize,
    /// When true, a total failure returns an empty result instead of an error
    pub skip_unavailable_shards: bool,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            max_parallel_replicas: 1,
            skip_unavailable_shards: false,
        }
    }
}

impl AcquireSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.max_parallel_replicas == 0 {
            return Err("max_parallel_replicas must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failover_config_defaults() {
        let config = FailoverConfig::default();
        assert_eq!(config.max_tries, 3);
        assert_eq!(config.decrease_error_period, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_failover_config_rejects_zero_period() {
        let config = FailoverConfig {
            decrease_error_period: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_acquire_settings_defaults() {
        let settings = AcquireSettings::default();
        assert_eq!(settings.max_parallel_replicas, 1);
        assert!(!settings.skip_unavailable_shards);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_acquire_settings_rejects_zero_parallelism() {
        let settings = AcquireSettings {
            max_parallel_replicas: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
