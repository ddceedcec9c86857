//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid request timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Poll interval must be greater than zero")]
    InvalidPollInterval,

    #[error("Season prefix cannot be empty")]
    EmptySeasonPrefix,

    #[error("Data file path cannot be empty")]
    EmptyDataFile,
}
