//! Daily sweep handler.

mod run_daily_sweep;

pub use run_daily_sweep::{RunDailySweepCommand, RunDailySweepHandler, SweepOptions, SweepReport};
