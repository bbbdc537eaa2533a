//! Column resolution
//!
//! Vendor exports name their columns freely, so columns are located by
//! substring matching against lower-cased header names. The vocabularies are
//! ordered tables: earlier patterns take priority, and a new header variant is
//! a new table entry rather than a new branch.

use crate::tokenizer::CsvRow;
use once_cell::sync::Lazy;
use regex::Regex;

/// A header matches when it contains every `all_of` term and, if `any_of` is
/// non-empty, at least one `any_of` term
#[derive(Debug, Clone, Copy)]
pub struct KeyPattern {
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
}

impl KeyPattern {
    pub const fn all(all_of: &'static [&'static str]) -> Self {
        Self { all_of, any_of: &[] }
    }

    pub const fn with_any(
        all_of: &'static [&'static str],
        any_of: &'static [&'static str],
    ) -> Self {
        Self { all_of, any_of }
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.all_of.iter().all(|term| key.contains(term))
            && (self.any_of.is_empty() || self.any_of.iter().any(|term| key.contains(term)))
    }
}

/// Sleep duration columns, most specific phrasing first
pub const SLEEP_DURATION: &[KeyPattern] = &[
    KeyPattern::all(&["sleep duration"]),
    KeyPattern::all(&["total sleep time"]),
    KeyPattern::all(&["time asleep"]),
    KeyPattern::all(&["duration"]),
    KeyPattern::all(&["asleep time"]),
    KeyPattern::all(&["minutes asleep"]),
    KeyPattern::all(&["hours asleep"]),
];

/// Last-resort sleep duration columns, only consulted when some header
/// mentions sleep
pub const SLEEP_DURATION_FALLBACK: &[KeyPattern] =
    &[KeyPattern::with_any(&[], &["duration", "minutes"])];

pub const SLEEP_SCORE: &[KeyPattern] = &[
    KeyPattern::all(&["sleep", "score"]),
    KeyPattern::all(&["score"]),
];

pub const HRV_VALUE: &[KeyPattern] =
    &[KeyPattern::with_any(&["hrv"], &["avg", "average", "last"])];

pub const RESTING_HR: &[KeyPattern] = &[KeyPattern::all(&["resting"])];

pub const ACTIVITY_START: &[KeyPattern] = &[KeyPattern::with_any(&["start"], &["date", "time"])];

pub const ACTIVITY_DURATION: &[KeyPattern] = &[KeyPattern::all(&["duration"])];

/// Companion year column for day/month-only dates
pub const YEAR: &[KeyPattern] = &[KeyPattern::all(&["year"])];

const CALENDAR_DATE: KeyPattern = KeyPattern::all(&["calendar", "date"]);
const ANY_DATE: KeyPattern = KeyPattern::all(&["date"]);

static STANDALONE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("valid year pattern"));

/// Locate the column that carries the row's date.
///
/// Order: a "calendar date" header; else the first column whose value holds a
/// standalone 4-digit number; else the first value with an ISO `T` marker;
/// else the first header containing "date".
pub fn resolve_date_key(row: &CsvRow) -> Option<&str> {
    if let Some(key) = row.keys().find(|k| CALENDAR_DATE.matches(k)) {
        return Some(key);
    }
    if let Some((key, _)) = row.iter().find(|(_, v)| STANDALONE_YEAR.is_match(v)) {
        return Some(key);
    }
    if let Some((key, _)) = row.iter().find(|(_, v)| v.contains('T')) {
        return Some(key);
    }
    row.keys().find(|k| ANY_DATE.matches(k))
}

/// Locate a metric column: the first header matching the highest-priority
/// pattern that matches anything
pub fn resolve_metric_key<'a>(row: &'a CsvRow, vocabulary: &[KeyPattern]) -> Option<&'a str> {
    vocabulary
        .iter()
        .find_map(|pattern| row.keys().find(|k| pattern.matches(k)))
}

/// Whether any header contains `term`
pub fn has_key_containing(row: &CsvRow, term: &str) -> bool {
    row.keys().any(|k| k.to_lowercase().contains(term))
}
