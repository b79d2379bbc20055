//! Lifecycle policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::lifecycle::{LifecyclePolicy, RenewalStrategy};

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Days between lapsing and automatic termination
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: u32,

    /// Suspension length when the caller supplies no end date
    #[serde(default = "default_suspend_period_days")]
    pub suspend_period_days: u32,

    #[serde(default)]
    pub renewal_strategy: RenewalStrategy,

    /// Manual terminations of open participations need approval
    #[serde(default = "default_require_termination_approval")]
    pub require_termination_approval: bool,
}

impl LifecycleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.grace_period_days == 0 || self.grace_period_days > 365 {
            return Err(ValidationError::InvalidGracePeriod(self.grace_period_days));
        }
        if self.suspend_period_days == 0 || self.suspend_period_days > 730 {
            return Err(ValidationError::InvalidSuspendPeriod(self.suspend_period_days));
        }
        Ok(())
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period_days: default_grace_period_days(),
            suspend_period_days: default_suspend_period_days(),
            renewal_strategy: RenewalStrategy::default(),
            require_termination_approval: default_require_termination_approval(),
        }
    }
}

impl From<&LifecycleConfig> for LifecyclePolicy {
    fn from(config: &LifecycleConfig) -> Self {
        let approval_required = if config.require_termination_approval {
            LifecyclePolicy::termination_approvals()
        } else {
            Vec::new()
        };
        LifecyclePolicy {
            grace_period_days: config.grace_period_days,
            suspend_period_days: config.suspend_period_days,
            renewal_strategy: config.renewal_strategy,
            approval_required,
        }
    }
}

fn default_grace_period_days() -> u32 {
    30
}

fn default_suspend_period_days() -> u32 {
    90
}

fn default_require_termination_approval() -> bool {
    true
}
