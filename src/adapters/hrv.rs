//! HRV export adapter

use crate::columns::{resolve_metric_key, HRV_VALUE};
use crate::tokenizer::CsvRow;
use crate::types::DailyMetricPartial;

use super::{cell, parse_number, set_present, CsvSource, SourceExtractor};

/// HRV export adapter (nightly average or last-night value, in ms)
pub struct HrvExtractor;

impl SourceExtractor for HrvExtractor {
    fn source(&self) -> CsvSource {
        CsvSource::Hrv
    }

    fn metric_keys<'a>(&self, row: &'a CsvRow) -> Vec<(&'static str, Option<&'a str>)> {
        vec![("hrv_ms", resolve_metric_key(row, HRV_VALUE))]
    }

    fn apply(&self, row: &CsvRow, partial: &mut DailyMetricPartial) {
        set_present(&mut partial.hrv_ms, cell(row, HRV_VALUE).and_then(parse_number));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_hrv_export() {
        let csv = "Date,Overnight HRV Avg,HRV Status\n2024-03-01,48,Balanced\n2024-03-02,,Low\n";
        let map = HrvExtractor.extract(csv);

        let march_1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let march_2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(map[&march_1].hrv_ms, Some(48.0));
        assert_eq!(map[&march_2].hrv_ms, None);
        assert_eq!(map[&march_1].sleep_duration_min, None);
    }

    #[test]
    fn test_hrv_without_value_column() {
        let csv = "Date,HRV Status\n2024-03-01,Balanced\n";
        let map = HrvExtractor.extract(csv);
        assert_eq!(map.len(), 1);
        assert!(map.values().all(|p| p.hrv_ms.is_none()));
    }
}
