//! Snapshot merging
//!
//! Combines the per-source partial maps into one snapshot per date. For every
//! field the first source (in the order supplied) with a value wins; merging
//! never sums.

use crate::fallback::first_present;
use crate::types::{DailyMetricPartial, DailySnapshot, PartialMap};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Merger for per-source partial maps
pub struct SnapshotMerger;

impl SnapshotMerger {
    /// Merge partial maps, earlier maps taking priority. Every date mentioned
    /// by any source is emitted, even when all its fields are missing.
    pub fn merge(parts: &[PartialMap]) -> BTreeMap<NaiveDate, DailySnapshot> {
        let dates: BTreeSet<NaiveDate> = parts.iter().flat_map(|p| p.keys().copied()).collect();

        dates
            .into_iter()
            .map(|date| {
                let candidates: Vec<&DailyMetricPartial> =
                    parts.iter().filter_map(|p| p.get(&date)).collect();
                let pick = |field: fn(&DailyMetricPartial) -> Option<f64>| {
                    first_present(candidates.iter().map(|c| field(*c)))
                };

                let snapshot = DailySnapshot {
                    date,
                    sleep_duration_min: pick(|p| p.sleep_duration_min),
                    sleep_score: pick(|p| p.sleep_score),
                    hrv_ms: pick(|p| p.hrv_ms),
                    resting_hr_bpm: pick(|p| p.resting_hr_bpm),
                    training_minutes: pick(|p| p.training_minutes),
                };
                (date, snapshot)
            })
            .collect()
    }

    /// Merge and return snapshots sorted by date
    pub fn merge_sorted(parts: &[PartialMap]) -> Vec<DailySnapshot> {
        Self::merge(parts).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn part(date: NaiveDate, partial: DailyMetricPartial) -> PartialMap {
        PartialMap::from([(date, partial)])
    }

    fn hrv(value: Option<f64>) -> DailyMetricPartial {
        DailyMetricPartial {
            hrv_ms: value,
            ..Default::default()
        }
    }

    #[test]
    fn test_later_source_fills_missing_field() {
        let merged = SnapshotMerger::merge(&[part(d(1), hrv(None)), part(d(1), hrv(Some(42.0)))]);
        assert_eq!(merged[&d(1)].hrv_ms, Some(42.0));
    }

    #[test]
    fn test_earlier_source_wins() {
        let merged =
            SnapshotMerger::merge(&[part(d(1), hrv(Some(10.0))), part(d(1), hrv(Some(99.0)))]);
        assert_eq!(merged[&d(1)].hrv_ms, Some(10.0));
    }

    #[test]
    fn test_fields_from_different_sources_combine() {
        let sleep = part(
            d(1),
            DailyMetricPartial {
                sleep_duration_min: Some(450.0),
                sleep_score: Some(82.0),
                ..Default::default()
            },
        );
        let heart = part(
            d(1),
            DailyMetricPartial {
                resting_hr_bpm: Some(52.0),
                ..Default::default()
            },
        );
        let activities = part(
            d(2),
            DailyMetricPartial {
                training_minutes: Some(25.0),
                ..Default::default()
            },
        );

        let merged = SnapshotMerger::merge_sorted(&[sleep, heart, activities]);

        assert_eq!(
            merged,
            vec![
                DailySnapshot {
                    date: d(1),
                    sleep_duration_min: Some(450.0),
                    sleep_score: Some(82.0),
                    hrv_ms: None,
                    resting_hr_bpm: Some(52.0),
                    training_minutes: None,
                },
                DailySnapshot {
                    training_minutes: Some(25.0),
                    ..DailySnapshot::empty(d(2))
                },
            ]
        );
    }

    #[test]
    fn test_all_null_date_still_emitted() {
        let merged = SnapshotMerger::merge(&[part(d(5), DailyMetricPartial::default())]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&d(5)], DailySnapshot::empty(d(5)));
    }

    #[test]
    fn test_output_sorted_by_date() {
        let mut later = PartialMap::new();
        later.insert(d(9), hrv(Some(1.0)));
        later.insert(d(3), hrv(Some(2.0)));
        let merged = SnapshotMerger::merge_sorted(&[later, part(d(6), hrv(None))]);
        let dates: Vec<NaiveDate> = merged.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![d(3), d(6), d(9)]);
    }

    #[test]
    fn test_no_parts() {
        assert!(SnapshotMerger::merge(&[]).is_empty());
    }
}
