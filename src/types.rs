//! Core types for the FlowTrack ingestion pipeline
//!
//! This module defines the value objects that flow through each stage: partial
//! per-source metrics, merged daily snapshots, stored external rows, manual
//! logs, and the reconciled insight rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Provider identifier for external snapshot provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Garmin,
    MyFitnessPal,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Garmin => "garmin",
            Provider::MyFitnessPal => "myfitnesspal",
        }
    }
}

/// Day tag marking a night shared with a partner
pub const TAG_PARTNER_SLEEPOVER: &str = "partner_sleepover";

/// Day tag marking a sick day
pub const TAG_SICK: &str = "sick";

/// What a single source file could determine about one calendar date
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricPartial {
    /// Total sleep (minutes)
    pub sleep_duration_min: Option<f64>,
    /// Vendor sleep score (raw scale)
    pub sleep_score: Option<f64>,
    /// Heart rate variability (ms)
    pub hrv_ms: Option<f64>,
    /// Resting heart rate (bpm)
    pub resting_hr_bpm: Option<f64>,
    /// Summed activity duration (minutes)
    pub training_minutes: Option<f64>,
}

/// Partial metrics from one source, keyed and ordered by date
pub type PartialMap = BTreeMap<NaiveDate, DailyMetricPartial>;

/// One day's merged external metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub sleep_duration_min: Option<f64>,
    pub sleep_score: Option<f64>,
    pub hrv_ms: Option<f64>,
    pub resting_hr_bpm: Option<f64>,
    pub training_minutes: Option<f64>,
}

impl DailySnapshot {
    /// Snapshot for `date` with no metrics yet
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_duration_min: None,
            sleep_score: None,
            hrv_ms: None,
            resting_hr_bpm: None,
            training_minutes: None,
        }
    }
}

/// Upsert record handed to the storage collaborator for one imported day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSnapshotInput {
    pub provider: Provider,
    pub date: NaiveDate,
    pub user_id: Option<String>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<f64>,
    pub resting_hr: Option<f64>,
    pub hrv_score: Option<f64>,
    pub training_minutes: Option<f64>,
    pub raw_payload: serde_json::Value,
}

impl ExternalSnapshotInput {
    /// Map a merged snapshot onto the stored column layout
    pub fn from_snapshot(provider: Provider, user_id: &str, snapshot: &DailySnapshot) -> Self {
        let raw_payload = serde_json::json!({
            "provider": "garmin_csv",
            "sleep_duration_min": snapshot.sleep_duration_min,
            "sleep_score": snapshot.sleep_score,
            "hrv_ms": snapshot.hrv_ms,
            "resting_hr_bpm": snapshot.resting_hr_bpm,
            "training_minutes": snapshot.training_minutes,
        });

        Self {
            provider,
            date: snapshot.date,
            user_id: Some(user_id.to_string()),
            sleep_hours: snapshot.sleep_duration_min.map(|min| min / 60.0),
            sleep_quality: snapshot.sleep_score,
            resting_hr: snapshot.resting_hr_bpm,
            hrv_score: snapshot.hrv_ms,
            training_minutes: snapshot.training_minutes,
            raw_payload,
        }
    }
}

/// Stored external daily snapshot row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSnapshot {
    pub id: Uuid,
    pub user_id: String,
    /// Provider name as stored; compared case-insensitively
    pub provider: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub sleep_quality: Option<f64>,
    #[serde(default)]
    pub resting_hr: Option<f64>,
    #[serde(default)]
    pub hrv_score: Option<f64>,
    #[serde(default)]
    pub training_minutes: Option<f64>,
    #[serde(default)]
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExternalSnapshot {
    pub fn is_garmin(&self) -> bool {
        self.provider.eq_ignore_ascii_case(Provider::Garmin.as_str())
    }
}

/// Flow rating of one deep-work session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRating {
    pub date: NaiveDate,
    #[serde(default)]
    pub flow_rating: Option<f64>,
}

/// Manually entered physiological log for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysioLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub sleep_quality: Option<f64>,
    #[serde(default)]
    pub caffeine_total_mg: Option<f64>,
    #[serde(default)]
    pub hrv_score: Option<f64>,
    #[serde(default)]
    pub resting_hr: Option<f64>,
    #[serde(default)]
    pub day_tags: Option<Vec<String>>,
}

impl PhysioLog {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.day_tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

/// One reconciled day in the insights window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsightRow {
    pub date: NaiveDate,
    /// Mean session flow rating, if any sessions were logged
    pub avg_flow: Option<f64>,
    pub session_count: u32,
    /// Manual sleep hours
    pub sleep_hours: Option<f64>,
    /// Manual sleep quality
    pub sleep_quality: Option<f64>,
    pub caffeine_total_mg: Option<f64>,
    /// Manual HRV score
    pub hrv_score: Option<f64>,
    /// Device resting heart rate
    pub resting_hr: Option<f64>,
    /// Device training minutes
    pub training_minutes: Option<f64>,
    pub external_sleep_hours: Option<f64>,
    pub external_hrv_score: Option<f64>,
    pub merged_sleep_hours: Option<f64>,
    pub merged_hrv_score: Option<f64>,
    pub merged_resting_hr: Option<f64>,
    pub has_partner_sleepover: bool,
    pub has_sick_tag: bool,
}
