//! Application configuration module
//!
//! Configuration is read from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `MEMBER_LIFECYCLE` prefix and nested
//! values are separated by double underscores. Every value has a default.
//!
//! # Example
//!
//! ```no_run
//! use member_lifecycle::config::AppConfig;
//! use member_lifecycle::domain::lifecycle::LifecyclePolicy;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let policy = LifecyclePolicy::from(&config.lifecycle);
//! ```

mod error;
mod lifecycle;
mod logging;
mod snapshot;
mod sweep;

pub use error::{ConfigError, ValidationError};
pub use lifecycle::LifecycleConfig;
pub use logging::LoggingConfig;
pub use snapshot::SnapshotConfig;
pub use sweep::SweepConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Grace and suspension periods, renewal strategy, approvals
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Daily sweep behaviour
    #[serde(default)]
    pub sweep: SweepConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `MEMBER_LIFECYCLE__*` variables.
    ///
    /// - `MEMBER_LIFECYCLE__LIFECYCLE__GRACE_PERIOD_DAYS=45` -> `lifecycle.grace_period_days = 45`
    /// - `MEMBER_LIFECYCLE__SWEEP__AUTO_RENEW=true` -> `sweep.auto_renew = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("MEMBER_LIFECYCLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.lifecycle.validate()?;
        self.sweep.validate()?;
        self.logging.validate()?;
        self.snapshot.validate()?;
        Ok(())
    }
}
