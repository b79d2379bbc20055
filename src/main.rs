//! Member lifecycle sweep runner.
//!
//! Loads a YAML snapshot, runs the daily sweep for one date and writes the
//! snapshot back. The date defaults to today:
//!
//! ```text
//! member-lifecycle [YYYY-MM-DD]
//! ```

use chrono::NaiveDate;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use member_lifecycle::adapters::{
    InMemoryBackend, InMemoryEventBus, SnapshotStore, TracingBenefitHooks,
};
use member_lifecycle::application::handlers::{
    ProcessChangeRequestHandler, ProcessScheduledChangesHandler, RenewParticipationHandler,
    RunDailySweepCommand, RunDailySweepHandler, SweepOptions, TransitionExecutor,
};
use member_lifecycle::config::AppConfig;
use member_lifecycle::domain::lifecycle::{LifecycleEngine, LifecyclePolicy};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = config.logging.init() {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sweep failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let as_of = match std::env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")?,
        None => chrono::Local::now().date_naive(),
    };

    let store = SnapshotStore::new(&config.snapshot.path);
    let backend = InMemoryBackend::from_snapshot(store.load_or_default().await?).await?;
    info!(
        path = %store.path().display(),
        %as_of,
        "snapshot loaded"
    );

    let bus = Arc::new(InMemoryEventBus::new());
    let executor = TransitionExecutor::new(
        LifecycleEngine::new(LifecyclePolicy::from(&config.lifecycle)),
        backend.participations.clone(),
        bus.clone(),
        Arc::new(TracingBenefitHooks::new()),
        backend.members.clone(),
    );

    let process = Arc::new(ProcessChangeRequestHandler::new(
        executor.clone(),
        backend.change_requests.clone(),
        backend.catalog.clone(),
        backend.members.clone(),
    ));
    let scheduled = Arc::new(ProcessScheduledChangesHandler::new(
        backend.change_requests.clone(),
        process,
    ));
    let renewals = Arc::new(RenewParticipationHandler::new(
        executor.clone(),
        backend.catalog.clone(),
        backend.members.clone(),
    ));

    let sweep = RunDailySweepHandler::new(executor, SweepOptions::from(&config.sweep))
        .with_scheduled_changes(scheduled)
        .with_renewals(renewals);

    let report = sweep.handle(RunDailySweepCommand { as_of }).await?;
    info!(
        evaluated = report.evaluated,
        transitioned = report.transitioned,
        events = bus.event_count(),
        "sweep complete"
    );

    store.save(&backend.snapshot().await).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
