//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `BAN_WATCH` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use ban_watch::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Roster document at {}", config.storage.data_file.display());
//! ```

mod error;
mod remote;
mod scheduler;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use remote::RemoteConfig;
pub use scheduler::SchedulerSettings;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads. Only commands
/// that run a pass need `remote.status_base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Roster document location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote status and rank services
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Throttling and periodic pass timing
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BAN_WATCH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `BAN_WATCH__STORAGE__DATA_FILE=/data/accounts.json` -> `storage.data_file`
    /// - `BAN_WATCH__REMOTE__STATUS_BASE_URL=...` -> `remote.status_base_url`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BAN_WATCH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for malformed URLs, out-of-range timeouts,
    /// an empty season prefix or data file, or a zero poll interval.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.remote.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            remote: RemoteConfig::default(),
            scheduler: SchedulerSettings::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info,ban_watch=debug".to_string()
}
