//! Source file adapters
//!
//! Each adapter reads one kind of wearable CSV export and maps it to partial
//! daily metrics keyed by calendar date. Rows whose date cannot be normalized
//! are skipped without error.

mod activities;
mod heart_rate;
mod hrv;
mod sleep;

pub use activities::ActivitiesExtractor;
pub use heart_rate::HeartRateExtractor;
pub use hrv::HrvExtractor;
pub use sleep::SleepExtractor;

use crate::columns::{resolve_date_key, resolve_metric_key, KeyPattern};
use crate::normalizer::DateNormalizer;
use crate::tokenizer::{parse_csv, CsvRow};
use crate::types::{DailyMetricPartial, PartialMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of export file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvSource {
    Sleep,
    Hrv,
    HeartRate,
    Activities,
}

impl CsvSource {
    /// All sources in merge priority order
    pub const ALL: [CsvSource; 4] = [
        CsvSource::Sleep,
        CsvSource::Hrv,
        CsvSource::HeartRate,
        CsvSource::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CsvSource::Sleep => "sleep",
            CsvSource::Hrv => "hrv",
            CsvSource::HeartRate => "heart_rate",
            CsvSource::Activities => "activities",
        }
    }

    pub fn extractor(&self) -> &'static dyn SourceExtractor {
        match self {
            CsvSource::Sleep => &SleepExtractor,
            CsvSource::Hrv => &HrvExtractor,
            CsvSource::HeartRate => &HeartRateExtractor,
            CsvSource::Activities => &ActivitiesExtractor,
        }
    }
}

/// Trait for per-source CSV adapters
pub trait SourceExtractor {
    fn source(&self) -> CsvSource;

    /// Column holding the row's date
    fn date_key<'a>(&self, row: &'a CsvRow) -> Option<&'a str> {
        resolve_date_key(row)
    }

    /// Metric columns this adapter would read from `row`, by metric name
    fn metric_keys<'a>(&self, row: &'a CsvRow) -> Vec<(&'static str, Option<&'a str>)>;

    /// Fold one dated row into that date's partial
    fn apply(&self, row: &CsvRow, partial: &mut DailyMetricPartial);

    /// Parse a whole export into per-date partials
    fn extract(&self, csv_text: &str) -> PartialMap {
        let mut map = PartialMap::new();
        for (index, row) in parse_csv(csv_text).iter().enumerate() {
            match row_date(self, row) {
                Some(date) => self.apply(row, map.entry(date).or_default()),
                None => debug!(
                    source = self.source().as_str(),
                    row = index + 1,
                    "skipping row without a usable date"
                ),
            }
        }
        map
    }
}

fn row_date<E: SourceExtractor + ?Sized>(extractor: &E, row: &CsvRow) -> Option<chrono::NaiveDate> {
    let key = extractor.date_key(row)?;
    DateNormalizer::normalize(row.get(key).unwrap_or_default(), row)
}

/// Column diagnostics for one export file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: CsvSource,
    pub headers: Vec<String>,
    /// Date column resolved on the first data row
    pub date_key: Option<String>,
    /// Metric columns resolved on the first data row
    pub metric_keys: Vec<MetricColumn>,
    pub rows: usize,
    /// Rows whose date normalizes
    pub dated_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricColumn {
    pub metric: String,
    pub key: Option<String>,
}

/// Report how an export's columns resolve, for debugging new header variants
pub fn inspect_csv(source: CsvSource, csv_text: &str) -> SourceReport {
    let extractor = source.extractor();
    let rows = parse_csv(csv_text);
    let first = rows.first();

    SourceReport {
        source,
        headers: first
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default(),
        date_key: first
            .and_then(|row| extractor.date_key(row))
            .map(str::to_string),
        metric_keys: first
            .map(|row| {
                extractor
                    .metric_keys(row)
                    .into_iter()
                    .map(|(metric, key)| MetricColumn {
                        metric: metric.to_string(),
                        key: key.map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        rows: rows.len(),
        dated_rows: rows
            .iter()
            .filter(|row| row_date(extractor, row).is_some())
            .count(),
    }
}

/// Cell of the first column matching `vocabulary`
pub(crate) fn cell<'a>(row: &'a CsvRow, vocabulary: &[KeyPattern]) -> Option<&'a str> {
    resolve_metric_key(row, vocabulary).and_then(|key| row.get(key))
}

/// Numeric cell value; empty or non-numeric cells are missing
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Overwrite `slot` only with a present value
pub(crate) fn set_present(slot: &mut Option<f64>, value: Option<f64>) {
    if value.is_some() {
        *slot = value;
    }
}
