//! Daily insight reconciliation
//!
//! Joins session flow ratings, manual physio logs and imported external
//! snapshots into one row per calendar day over a trailing window. Manually
//! entered values take precedence over device values.

use crate::fallback::first_numeric;
use crate::types::{
    DailyInsightRow, ExternalSnapshot, PhysioLog, SessionRating, TAG_PARTNER_SLEEPOVER, TAG_SICK,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default insights window in days
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Reconciler for the insights view
pub struct InsightsReconciler;

impl InsightsReconciler {
    /// One row per day in `[today - (window_days - 1), today]`, ascending.
    ///
    /// Days without any data still produce a row. Rows outside the window in
    /// the inputs are ignored.
    pub fn reconcile(
        today: NaiveDate,
        window_days: u32,
        sessions: &[SessionRating],
        physio_logs: &[PhysioLog],
        external: &[ExternalSnapshot],
    ) -> Vec<DailyInsightRow> {
        let Some(from) = window_start(today, window_days) else {
            return Vec::new();
        };

        let mut ratings_by_date: HashMap<NaiveDate, Vec<Option<f64>>> = HashMap::new();
        for session in sessions {
            ratings_by_date
                .entry(session.date)
                .or_default()
                .push(session.flow_rating);
        }

        let physio_by_date: HashMap<NaiveDate, &PhysioLog> =
            physio_logs.iter().map(|p| (p.date, p)).collect();

        let external_by_date = external_by_date(external);

        from.iter_days()
            .take_while(|date| *date <= today)
            .map(|date| {
                let ratings = ratings_by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
                let physio = physio_by_date.get(&date).copied();
                let ext = external_by_date.get(&date).copied();
                build_row(date, ratings, physio, ext)
            })
            .collect()
    }
}

fn window_start(today: NaiveDate, window_days: u32) -> Option<NaiveDate> {
    if window_days == 0 {
        return None;
    }
    today.checked_sub_days(Days::new(u64::from(window_days - 1)))
}

/// External row per date; a `garmin` row beats any other provider, otherwise
/// the first row seen is kept
fn external_by_date(external: &[ExternalSnapshot]) -> HashMap<NaiveDate, &ExternalSnapshot> {
    let mut by_date: HashMap<NaiveDate, &ExternalSnapshot> = HashMap::new();
    for snapshot in external {
        by_date
            .entry(snapshot.date)
            .and_modify(|current| {
                if !current.is_garmin() && snapshot.is_garmin() {
                    *current = snapshot;
                }
            })
            .or_insert(snapshot);
    }
    by_date
}

fn build_row(
    date: NaiveDate,
    ratings: &[Option<f64>],
    physio: Option<&PhysioLog>,
    ext: Option<&ExternalSnapshot>,
) -> DailyInsightRow {
    let session_count = ratings.len() as u32;
    // Unrated sessions count toward the mean as 0
    let avg_flow = (session_count > 0).then(|| {
        ratings.iter().map(|r| r.unwrap_or(0.0)).sum::<f64>() / f64::from(session_count)
    });

    let manual = |field: fn(&PhysioLog) -> Option<f64>| physio.and_then(field);
    let device = |field: fn(&ExternalSnapshot) -> Option<f64>| ext.and_then(field);

    DailyInsightRow {
        date,
        avg_flow,
        session_count,
        sleep_hours: manual(|p| p.sleep_hours),
        sleep_quality: manual(|p| p.sleep_quality),
        caffeine_total_mg: manual(|p| p.caffeine_total_mg),
        hrv_score: manual(|p| p.hrv_score),
        resting_hr: device(|e| e.resting_hr),
        training_minutes: device(|e| e.training_minutes),
        external_sleep_hours: device(|e| e.sleep_hours),
        external_hrv_score: device(|e| e.hrv_score),
        merged_sleep_hours: first_numeric([manual(|p| p.sleep_hours), device(|e| e.sleep_hours)]),
        merged_hrv_score: first_numeric([manual(|p| p.hrv_score), device(|e| e.hrv_score)]),
        merged_resting_hr: first_numeric([manual(|p| p.resting_hr), device(|e| e.resting_hr)]),
        has_partner_sleepover: physio.is_some_and(|p| p.has_tag(TAG_PARTNER_SLEEPOVER)),
        has_sick_tag: physio.is_some_and(|p| p.has_tag(TAG_SICK)),
    }
}

/// Narrowing applied by the insights view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightFilter {
    /// Keep only the last `range_days` days
    #[serde(default)]
    pub range_days: Option<u32>,
    #[serde(default)]
    pub exclude_sick: bool,
    #[serde(default)]
    pub exclude_partner_sleepover: bool,
}

impl InsightFilter {
    pub fn apply(&self, rows: Vec<DailyInsightRow>, today: NaiveDate) -> Vec<DailyInsightRow> {
        let cutoff = match self.range_days {
            Some(days) => match window_start(today, days) {
                Some(cutoff) => Some(cutoff),
                None => return Vec::new(),
            },
            None => None,
        };

        rows.into_iter()
            .filter(|row| cutoff.map_or(true, |c| row.date >= c))
            .filter(|row| !(self.exclude_sick && row.has_sick_tag))
            .filter(|row| !(self.exclude_partner_sleepover && row.has_partner_sleepover))
            .collect()
    }
}
