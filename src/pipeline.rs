//! Pipeline orchestration
//!
//! This module provides the public API for FlowTrack ingestion. It runs the
//! import path (CSV exports to stored daily snapshots) and the insights read
//! path (stored rows and manual logs to reconciled daily rows).

use crate::adapters::CsvSource;
use crate::error::IngestError;
use crate::insights::InsightsReconciler;
use crate::merge::SnapshotMerger;
use crate::store::SnapshotStore;
use crate::types::{
    DailyInsightRow, DailySnapshot, ExternalSnapshot, ExternalSnapshotInput, PartialMap,
    PhysioLog, Provider, SessionRating,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of dates echoed back in an import summary
pub const SAMPLE_DATES: usize = 10;

/// Number of snapshots echoed back in an import summary
pub const SAMPLE_SNAPSHOTS: usize = 50;

/// Raw export texts submitted for one import; each is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportFiles {
    pub sleep_csv: Option<String>,
    pub hrv_csv: Option<String>,
    pub heart_rate_csv: Option<String>,
    pub activities_csv: Option<String>,
}

impl ImportFiles {
    pub fn get(&self, source: CsvSource) -> Option<&str> {
        let text = match source {
            CsvSource::Sleep => &self.sleep_csv,
            CsvSource::Hrv => &self.hrv_csv,
            CsvSource::HeartRate => &self.heart_rate_csv,
            CsvSource::Activities => &self.activities_csv,
        };
        text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub days_processed: usize,
    /// First dates of the import, ascending
    pub sample_dates: Vec<NaiveDate>,
    /// First snapshots of the import, ascending
    pub snapshots: Vec<DailySnapshot>,
}

impl ImportSummary {
    fn new(days_processed: usize, snapshots: &[DailySnapshot]) -> Self {
        Self {
            days_processed,
            sample_dates: snapshots.iter().take(SAMPLE_DATES).map(|s| s.date).collect(),
            snapshots: snapshots.iter().take(SAMPLE_SNAPSHOTS).cloned().collect(),
        }
    }
}

/// Build merged daily snapshots from the submitted exports.
///
/// Sources are extracted and merged in the fixed order sleep, HRV, heart
/// rate, activities; absent or empty texts are skipped.
///
/// # Example
/// ```ignore
/// let files = ImportFiles {
///     sleep_csv: Some(sleep_text),
///     ..Default::default()
/// };
/// let snapshots = build_daily_snapshots(&files);
/// ```
pub fn build_daily_snapshots(files: &ImportFiles) -> Vec<DailySnapshot> {
    let parts: Vec<PartialMap> = CsvSource::ALL
        .iter()
        .filter_map(|source| files.get(*source).map(|text| source.extractor().extract(text)))
        .collect();

    SnapshotMerger::merge_sorted(&parts)
}

/// Build snapshots and upsert each one as a `garmin` row for `user_id`.
///
/// Storage errors abort the import and are returned as-is.
pub fn import_garmin(
    store: &mut dyn SnapshotStore,
    user_id: &str,
    files: &ImportFiles,
) -> Result<ImportSummary, IngestError> {
    let snapshots = build_daily_snapshots(files);
    let sample: Vec<String> = snapshots
        .iter()
        .take(SAMPLE_DATES)
        .map(|s| s.date.to_string())
        .collect();
    info!(
        candidates = snapshots.len(),
        sample_dates = ?sample,
        "garmin import built daily snapshots"
    );

    let mut count = 0;
    for snapshot in &snapshots {
        store.upsert(ExternalSnapshotInput::from_snapshot(
            Provider::Garmin,
            user_id,
            snapshot,
        ))?;
        count += 1;
    }

    Ok(ImportSummary::new(count, &snapshots))
}

/// Reconcile insight rows for the window ending at `today`
pub fn daily_insights(
    today: NaiveDate,
    window_days: u32,
    sessions: &[SessionRating],
    physio_logs: &[PhysioLog],
    external: &[ExternalSnapshot],
) -> Vec<DailyInsightRow> {
    InsightsReconciler::reconcile(today, window_days, sessions, physio_logs, external)
}

/// Reconcile insight rows for the window ending today (local calendar date),
/// reading the user's external rows from `store`
pub fn daily_insights_from_store(
    store: &dyn SnapshotStore,
    user_id: &str,
    window_days: u32,
    sessions: &[SessionRating],
    physio_logs: &[PhysioLog],
) -> Result<Vec<DailyInsightRow>, IngestError> {
    let today = Local::now().date_naive();
    daily_insights_at(store, user_id, today, window_days, sessions, physio_logs)
}

/// As [`daily_insights_from_store`], for an explicit `today`
pub fn daily_insights_at(
    store: &dyn SnapshotStore,
    user_id: &str,
    today: NaiveDate,
    window_days: u32,
    sessions: &[SessionRating],
    physio_logs: &[PhysioLog],
) -> Result<Vec<DailyInsightRow>, IngestError> {
    let from = today
        .checked_sub_days(chrono::Days::new(u64::from(window_days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);
    let external = store.snapshots_since(user_id, from)?;
    Ok(daily_insights(today, window_days, sessions, physio_logs, &external))
}
