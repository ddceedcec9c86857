//! Pass scheduling and throttling configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Delay between records in the status sub-pass, in milliseconds
    #[serde(default = "default_status_delay")]
    pub status_delay_ms: u64,

    /// Delay between records in the rank sub-pass, in milliseconds
    #[serde(default = "default_rank_delay")]
    pub rank_delay_ms: u64,

    /// Delay before the startup pass, in milliseconds
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: u64,

    /// Time between periodic passes, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl SchedulerSettings {
    pub fn status_delay(&self) -> Duration {
        Duration::from_millis(self.status_delay_ms)
    }

    pub fn rank_delay(&self) -> Duration {
        Duration::from_millis(self.rank_delay_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        Ok(())
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            status_delay_ms: default_status_delay(),
            rank_delay_ms: default_rank_delay(),
            startup_delay_ms: default_startup_delay(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_status_delay() -> u64 {
    2000
}

fn default_rank_delay() -> u64 {
    1000
}

fn default_startup_delay() -> u64 {
    1000
}

fn default_poll_interval() -> u64 {
    30 * 60
}
