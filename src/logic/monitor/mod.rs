//! Monitor Module - Steady-State Polling Loop
//!
//! One cycle: fetch every sensor entry, skip the already-annotated ones,
//! score and annotate the rest, then wait a fixed interval and repeat. The
//! cycle itself lives in `cycle.rs` as an isolated function so it can be
//! unit-tested without the sleep.
//!
//! The processed-check is read-then-write with no atomicity guarantee; the
//! deployment constraint is a single active loop instance. Running two
//! concurrently is not supported (both may annotate the same entry,
//! last write wins).

pub mod cycle;

#[cfg(test)]
mod tests;

pub use cycle::{run_cycle, CycleReport};

use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::sleep;

use crate::constants;
use crate::logic::model::{AnomalyScorer, DecisionModel};
use crate::logic::store::SensorStore;

/// Recent errors kept on the status snapshot
const MAX_STATUS_ERRORS: usize = 10;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Unconditional wait between cycles (seconds)
    pub poll_interval_secs: u64,
    /// Baseline flow for loss estimation
    pub expected_flow: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: constants::get_poll_interval_secs(),
            expected_flow: constants::get_expected_flow(),
        }
    }
}

// ============================================================================
// STATUS
// ============================================================================

/// Process-wide monitoring status snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStatus {
    pub cycles: u64,
    pub entries_seen: u64,
    pub entries_annotated: u64,
    pub leaks_flagged: u64,
    pub scoring_failures: u64,
    pub last_cycle: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
}

static MONITOR_STATUS: Lazy<RwLock<MonitorStatus>> =
    Lazy::new(|| RwLock::new(MonitorStatus::default()));

/// Get current monitoring status
pub fn get_status() -> MonitorStatus {
    MONITOR_STATUS.read().clone()
}

fn record_cycle(report: &CycleReport) {
    let mut status = MONITOR_STATUS.write();
    status.cycles += 1;
    status.entries_seen += report.fetched as u64;
    status.entries_annotated += report.annotated as u64;
    status.leaks_flagged += report.leaks as u64;
    status.scoring_failures += report.failures as u64;
    status.last_cycle = Some(Utc::now());
}

fn record_error(message: String) {
    let mut status = MONITOR_STATUS.write();
    status.cycles += 1;
    status.last_cycle = Some(Utc::now());
    status.errors.push(message);
    while status.errors.len() > MAX_STATUS_ERRORS {
        status.errors.remove(0);
    }
}

// ============================================================================
// LOOP
// ============================================================================

/// Run the monitoring loop until the process is terminated.
///
/// Store failures and empty fetches are transient: reported, then retried
/// after the same fixed wait as a successful cycle.
pub async fn run_loop<S, M>(store: &S, scorer: &AnomalyScorer<M>, config: &MonitorConfig)
where
    S: SensorStore,
    M: DecisionModel,
{
    log::info!(
        "Monitoring loop started (poll interval: {}s, expected flow: {})",
        config.poll_interval_secs,
        config.expected_flow
    );

    loop {
        match run_cycle(store, scorer, config.expected_flow).await {
            Ok(report) => {
                if report.fetched == 0 {
                    log::warn!("No sensor data found");
                }
                record_cycle(&report);
            }
            Err(e) => {
                log::warn!("Store fetch failed: {}", e);
                record_error(e.to_string());
            }
        }

        sleep(Duration::from_secs(config.poll_interval_secs)).await;
    }
}
