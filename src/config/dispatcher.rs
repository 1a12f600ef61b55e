//! Dispatcher loop configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing and sizing of the periodic dispatch loop
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Maximum messages fetched per tick
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Deadline for a whole tick, in seconds
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,

    /// Deadline for one webhook call, in seconds
    #[serde(default = "default_message_timeout")]
    pub message_timeout_secs: u64,

    /// Start the loop when the process boots
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl DispatcherConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    /// Validate dispatcher configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidDispatcher("interval must be positive"));
        }
        if self.batch_size == 0 {
            return Err(ValidationError::InvalidDispatcher("batch size must be positive"));
        }
        if self.batch_timeout_secs == 0 || self.message_timeout_secs == 0 {
            return Err(ValidationError::InvalidDispatcher("timeouts must be positive"));
        }
        if self.message_timeout_secs > self.batch_timeout_secs {
            return Err(ValidationError::InvalidDispatcher(
                "message timeout exceeds batch timeout",
            ));
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            batch_size: default_batch_size(),
            batch_timeout_secs: default_batch_timeout(),
            message_timeout_secs: default_message_timeout(),
            autostart: default_autostart(),
        }
    }
}

fn default_interval() -> u64 {
    120
}

fn default_batch_size() -> u32 {
    2
}

fn default_batch_timeout() -> u64 {
    10
}

fn default_message_timeout() -> u64 {
    5
}

fn default_autostart() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(120));
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.batch_timeout(), Duration::from_secs(10));
        assert_eq!(config.message_timeout(), Duration::from_secs(5));
        assert!(config.autostart);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = DispatcherConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_message_timeout_must_fit_in_batch() {
        let config = DispatcherConfig {
            batch_timeout_secs: 3,
            message_timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidDispatcher(
                "message timeout exceeds batch timeout"
            ))
        );
    }
}
