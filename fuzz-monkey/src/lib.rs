//! fuzz-monkey: run every configured attack and aggregate the verdicts

use chrono::Utc;
use monkey_common::Config;
use monkey_engine::AttackEngine;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

pub mod error;
pub mod logging;
pub mod report;

pub use error::MonkeyError;
pub use logging::{init_logging, LoggingConfig};
pub use report::RunSummary;

/// Knobs that apply to every attack of a run
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    /// Per-request deadline; None waits forever
    pub deadline: Option<Duration>,
    /// Seed for random method selection
    pub seed: Option<u64>,
}

/// Run `config` with the default reqwest and TCP transports
pub async fn run(config: &Config, settings: &RunSettings) -> Result<RunSummary, MonkeyError> {
    let engine = AttackEngine::with_default_transports()?
        .with_deadline(settings.deadline)
        .with_seed(settings.seed);

    Ok(run_with_engine(&engine, config).await)
}

/// Run every attack concurrently while a single consumer drains the results
pub async fn run_with_engine(engine: &AttackEngine, config: &Config) -> RunSummary {
    info!(
        "Unleashing the monkey on {} endpoints ({} attacks)",
        config.endpoints.len(),
        config.attack_count()
    );

    let started_at = Utc::now();
    let (tx, rx) = mpsc::unbounded_channel();

    let (_, summary) = tokio::join!(
        engine.run_all(config, tx),
        RunSummary::collect(started_at, rx)
    );

    info!("{} passed, {} failed", summary.passed(), summary.failed());
    summary
}
