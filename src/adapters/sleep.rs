//! Sleep export adapter
//!
//! Reads total sleep time and the vendor sleep score per night.

use crate::columns::{
    has_key_containing, resolve_metric_key, SLEEP_DURATION, SLEEP_DURATION_FALLBACK, SLEEP_SCORE,
};
use crate::normalizer::DurationNormalizer;
use crate::tokenizer::CsvRow;
use crate::types::DailyMetricPartial;

use super::{cell, parse_number, set_present, CsvSource, SourceExtractor};

/// Sleep export adapter
pub struct SleepExtractor;

impl SleepExtractor {
    fn duration_key<'a>(&self, row: &'a CsvRow) -> Option<&'a str> {
        resolve_metric_key(row, SLEEP_DURATION).or_else(|| {
            if has_key_containing(row, "sleep") {
                resolve_metric_key(row, SLEEP_DURATION_FALLBACK)
            } else {
                None
            }
        })
    }
}

impl SourceExtractor for SleepExtractor {
    fn source(&self) -> CsvSource {
        CsvSource::Sleep
    }

    fn metric_keys<'a>(&self, row: &'a CsvRow) -> Vec<(&'static str, Option<&'a str>)> {
        vec![
            ("sleep_duration_min", self.duration_key(row)),
            ("sleep_score", resolve_metric_key(row, SLEEP_SCORE)),
        ]
    }

    fn apply(&self, row: &CsvRow, partial: &mut DailyMetricPartial) {
        let minutes = self
            .duration_key(row)
            .and_then(|key| row.get(key))
            .and_then(DurationNormalizer::to_minutes)
            .map(|m| m as f64);
        let score = cell(row, SLEEP_SCORE).and_then(parse_number);

        set_present(&mut partial.sleep_duration_min, minutes);
        set_present(&mut partial.sleep_score, score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_garmin_sleep_export() {
        let csv = "Calendar Date,Sleep Duration,Sleep Score\n2024-03-01,07:30:00,82\n";
        let map = SleepExtractor.extract(csv);

        assert_eq!(map.len(), 1);
        assert_eq!(
            map[&d(2024, 3, 1)],
            DailyMetricPartial {
                sleep_duration_min: Some(450.0),
                sleep_score: Some(82.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_seconds_and_us_dates() {
        let csv = "Date,Total Sleep Time,Score\n03/02/2024,25200,\n15/03/2024,7.5h,77\n";
        let map = SleepExtractor.extract(csv);

        let march_2 = map[&d(2024, 3, 2)];
        assert_eq!(march_2.sleep_duration_min, Some(420.0));
        assert_eq!(march_2.sleep_score, None);

        let march_15 = map[&d(2024, 3, 15)];
        assert_eq!(march_15.sleep_duration_min, Some(450.0));
        assert_eq!(march_15.sleep_score, Some(77.0));
    }

    #[test]
    fn test_minutes_fallback_needs_sleep_header() {
        let csv = "date,sleep stage,minutes\n2024-03-01,deep,90\n";
        let map = SleepExtractor.extract(csv);
        // 90 read as seconds rounds to 2 minutes
        assert_eq!(map[&d(2024, 3, 1)].sleep_duration_min, Some(2.0));

        let csv = "date,minutes\n2024-03-01,90\n";
        let map = SleepExtractor.extract(csv);
        assert_eq!(map[&d(2024, 3, 1)].sleep_duration_min, None);
    }

    #[test]
    fn test_unparseable_date_dropped() {
        let csv = "Calendar Date,Sleep Duration,Sleep Score\nN/A,07:30:00,82\n2024-03-02,06:00:00,70\n";
        let map = SleepExtractor.extract(csv);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&d(2024, 3, 2)));
    }

    #[test]
    fn test_stray_quote_keeps_following_nights() {
        let csv = "Calendar Date,Sleep Duration,Sleep Score\n\
                   2024-03-01,\"07:30:00,82\n\
                   2024-03-02,06:00:00,70\n\
                   2024-03-03,05:00:00,60\n";
        let map = SleepExtractor.extract(csv);

        assert_eq!(map[&d(2024, 3, 2)].sleep_duration_min, Some(360.0));
        assert_eq!(map[&d(2024, 3, 2)].sleep_score, Some(70.0));
        assert_eq!(map[&d(2024, 3, 3)].sleep_duration_min, Some(300.0));
        assert_eq!(map[&d(2024, 3, 3)].sleep_score, Some(60.0));
    }

    #[test]
    fn test_later_row_does_not_erase_values() {
        let csv = "Calendar Date,Sleep Duration,Sleep Score\n2024-03-01,07:30:00,82\n2024-03-01,,\n2024-03-01,08:00:00,\n";
        let map = SleepExtractor.extract(csv);
        let day = map[&d(2024, 3, 1)];
        assert_eq!(day.sleep_duration_min, Some(480.0));
        assert_eq!(day.sleep_score, Some(82.0));
    }
}
