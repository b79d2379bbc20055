//! Daily sweep configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Participations transitioned concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Apply approved change requests whose effective date has arrived
    #[serde(default = "default_true")]
    pub process_scheduled_changes: bool,

    /// Renew funded auto-renew participations
    #[serde(default)]
    pub auto_renew: bool,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrency == 0 || self.max_concurrency > 256 {
            return Err(ValidationError::InvalidConcurrency(self.max_concurrency));
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            process_scheduled_changes: true,
            auto_renew: false,
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_true() -> bool {
    true
}
