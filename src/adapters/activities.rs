//! Activities export adapter
//!
//! A day may hold several activities, so durations accumulate per date
//! instead of replacing each other.

use crate::columns::{resolve_date_key, resolve_metric_key, ACTIVITY_DURATION, ACTIVITY_START};
use crate::normalizer::DurationNormalizer;
use crate::tokenizer::CsvRow;
use crate::types::DailyMetricPartial;

use super::{cell, CsvSource, SourceExtractor};

/// Activities export adapter
pub struct ActivitiesExtractor;

impl SourceExtractor for ActivitiesExtractor {
    fn source(&self) -> CsvSource {
        CsvSource::Activities
    }

    fn date_key<'a>(&self, row: &'a CsvRow) -> Option<&'a str> {
        resolve_metric_key(row, ACTIVITY_START).or_else(|| resolve_date_key(row))
    }

    fn metric_keys<'a>(&self, row: &'a CsvRow) -> Vec<(&'static str, Option<&'a str>)> {
        vec![("training_minutes", resolve_metric_key(row, ACTIVITY_DURATION))]
    }

    fn apply(&self, row: &CsvRow, partial: &mut DailyMetricPartial) {
        // Unreadable durations still mark the day as trained, with 0 minutes
        let minutes = cell(row, ACTIVITY_DURATION)
            .and_then(DurationNormalizer::to_seconds)
            .map(|secs| secs / 60.0)
            .unwrap_or(0.0);
        partial.training_minutes = Some(partial.training_minutes.unwrap_or(0.0) + minutes);
    }
}
