//! Heart-rate export adapter

use crate::columns::{resolve_metric_key, RESTING_HR};
use crate::tokenizer::CsvRow;
use crate::types::DailyMetricPartial;

use super::{cell, parse_number, set_present, CsvSource, SourceExtractor};

/// Heart-rate export adapter; only the resting rate is kept
pub struct HeartRateExtractor;

impl SourceExtractor for HeartRateExtractor {
    fn source(&self) -> CsvSource {
        CsvSource::HeartRate
    }

    fn metric_keys<'a>(&self, row: &'a CsvRow) -> Vec<(&'static str, Option<&'a str>)> {
        vec![("resting_hr_bpm", resolve_metric_key(row, RESTING_HR))]
    }

    fn apply(&self, row: &CsvRow, partial: &mut DailyMetricPartial) {
        set_present(
            &mut partial.resting_hr_bpm,
            cell(row, RESTING_HR).and_then(parse_number),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_resting_heart_rate() {
        let csv = "Date,Resting Heart Rate,Max Heart Rate\n2024/03/01,52,160\n2024/03/02,bpm,150\n";
        let map = HeartRateExtractor.extract(csv);

        let march_1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let march_2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(map[&march_1].resting_hr_bpm, Some(52.0));
        assert_eq!(map[&march_2].resting_hr_bpm, None);
    }

    #[test]
    fn test_day_month_rows_use_year_column() {
        let csv = "Calendar Date,Year,Resting HR\n1/3,2024,55\n";
        let map = HeartRateExtractor.extract(csv);
        let jan_3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(map[&jan_3].resting_hr_bpm, Some(55.0));
    }
}
