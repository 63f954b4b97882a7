//! One monitoring cycle, isolated from the sleep/retry mechanism.

use chrono::Utc;

use crate::logic::features::compute_features;
use crate::logic::loss::{estimate_loss, round2};
use crate::logic::model::{AnomalyScorer, DecisionModel};
use crate::logic::store::{Annotation, LeakStatus, SensorStore, StoreError};

/// What one pass over the store did
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleReport {
    /// Entries returned by the fetch
    pub fetched: usize,
    /// Entries already carrying an annotation
    pub skipped: usize,
    /// Entries annotated this cycle
    pub annotated: usize,
    /// Annotated entries flagged as leaks
    pub leaks: usize,
    /// Entries left unprocessed after a per-entry failure
    pub failures: usize,
}

/// Fetch all entries and annotate the unprocessed ones.
///
/// Only the fetch itself can fail the cycle; scoring or update errors are
/// reported per entry and never abort processing of sibling entries. A
/// failed entry still lacks annotation fields, so the next cycle retries it.
pub async fn run_cycle<S, M>(
    store: &S,
    scorer: &AnomalyScorer<M>,
    expected_flow: f64,
) -> Result<CycleReport, StoreError>
where
    S: SensorStore,
    M: DecisionModel,
{
    let entries = store.fetch_all().await?;

    let mut report = CycleReport {
        fetched: entries.len(),
        ..Default::default()
    };
    if entries.is_empty() {
        return Ok(report);
    }

    log::info!("Checking {} sensor entries", entries.len());

    // Store iteration order is arbitrary; nothing below depends on it
    for (key, entry) in &entries {
        if entry.is_processed() {
            report.skipped += 1;
            continue;
        }

        let features = compute_features(entry);
        let verdict = match scorer.score(&features) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Prediction error for {}: {}", key, e);
                report.failures += 1;
                continue;
            }
        };

        let annotation = Annotation {
            status: verdict.status,
            confidence: round2(verdict.confidence),
            estimated_loss: estimate_loss(entry, expected_flow),
            timestamp: entry
                .timestamp
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        };

        if let Err(e) = store.update(key, &annotation).await {
            log::error!("Update failed for {}: {}", key, e);
            report.failures += 1;
            continue;
        }

        if annotation.status == LeakStatus::Leak {
            report.leaks += 1;
        }
        report.annotated += 1;

        log::info!(
            "Updated {}: {}, {:.2}%, loss={}%",
            key,
            annotation.status,
            annotation.confidence,
            annotation.estimated_loss
        );
    }

    Ok(report)
}
