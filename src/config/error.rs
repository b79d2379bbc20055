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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Grace period must be between 1 and 365 days, got {0}")]
    InvalidGracePeriod(u32),

    #[error("Suspension period must be between 1 and 730 days, got {0}")]
    InvalidSuspendPeriod(u32),

    #[error("Sweep concurrency must be between 1 and 256, got {0}")]
    InvalidConcurrency(usize),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
