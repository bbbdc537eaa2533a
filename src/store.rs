//! Snapshot storage boundary
//!
//! The pipeline never queries storage itself; it hands upsert records to a
//! [`SnapshotStore`] and is handed stored rows back for reconciliation.
//! Upserts are keyed on `(user_id, provider, date)`, which makes re-importing
//! the same export idempotent.

use crate::error::IngestError;
use crate::types::{ExternalSnapshot, ExternalSnapshotInput};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage collaborator for external daily snapshots
pub trait SnapshotStore {
    /// Insert or replace the row for `(user_id, provider, date)`
    fn upsert(&mut self, input: ExternalSnapshotInput) -> Result<ExternalSnapshot, IngestError>;

    /// All of a user's rows dated `from` or later, ascending by date
    fn snapshots_since(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<ExternalSnapshot>, IngestError>;
}

/// In-process snapshot store, serializable to JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    rows: Vec<ExternalSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from JSON
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the store as JSON
    pub fn to_json(&self) -> Result<String, IngestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn upsert(&mut self, input: ExternalSnapshotInput) -> Result<ExternalSnapshot, IngestError> {
        let user_id = input
            .user_id
            .ok_or_else(|| IngestError::MissingField("user_id".to_string()))?;
        let provider = input.provider.as_str();
        let now = Utc::now();

        let existing = self
            .rows
            .iter_mut()
            .find(|r| r.user_id == user_id && r.provider == provider && r.date == input.date);

        let row = match existing {
            Some(row) => {
                row.sleep_hours = input.sleep_hours;
                row.sleep_quality = input.sleep_quality;
                row.resting_hr = input.resting_hr;
                row.hrv_score = input.hrv_score;
                row.training_minutes = input.training_minutes;
                row.raw_payload = input.raw_payload;
                row.updated_at = now;
                row.clone()
            }
            None => {
                let row = ExternalSnapshot {
                    id: Uuid::new_v4(),
                    user_id,
                    provider: provider.to_string(),
                    date: input.date,
                    sleep_hours: input.sleep_hours,
                    sleep_quality: input.sleep_quality,
                    resting_hr: input.resting_hr,
                    hrv_score: input.hrv_score,
                    training_minutes: input.training_minutes,
                    raw_payload: input.raw_payload,
                    created_at: now,
                    updated_at: now,
                };
                self.rows.push(row.clone());
                row
            }
        };

        Ok(row)
    }

    fn snapshots_since(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<ExternalSnapshot>, IngestError> {
        let mut rows: Vec<ExternalSnapshot> = self
            .rows
            .iter()
            .filter(|r| r.user_id == user_id && r.date >= from)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }
}
