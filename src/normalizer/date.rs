//! Date normalization
//!
//! Vendor exports write dates as ISO dates, ISO date-times, `mm/dd/yyyy`,
//! `dd/mm/yyyy`, `yyyy/mm/dd`, or as a bare day/month next to a separate year
//! column. Everything is reduced to a calendar date or rejected.

use crate::columns::{resolve_metric_key, YEAR};
use crate::tokenizer::CsvRow;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Earliest plausible year in an export
pub const MIN_YEAR: i32 = 2010;

/// Latest plausible year in an export
pub const MAX_YEAR: i32 = 2100;

static FIRST_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").expect("valid pattern"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid pattern"));
static ISO_DATETIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("valid pattern"));
static SLASH_DMY_OR_MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid pattern"));
static SLASH_YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").expect("valid pattern"));
static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})$").expect("valid pattern"));

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Normalizer for vendor date strings
pub struct DateNormalizer;

impl DateNormalizer {
    /// Normalize a date cell, consulting the row's year column for day/month
    /// values that carry no year
    pub fn normalize(raw: &str, row: &CsvRow) -> Option<NaiveDate> {
        Self::normalize_value(raw).or_else(|| day_month_with_year(raw.trim(), row))
    }

    /// Normalize a self-contained date string.
    ///
    /// The value must contain a 4-digit year within [`MIN_YEAR`, `MAX_YEAR`].
    /// Two leading numbers in `a/b/yyyy` are read month-first unless the first
    /// exceeds 12, so a genuinely ambiguous `03/04/2024` is March 4th.
    pub fn normalize_value(raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        let year = match FIRST_YEAR.captures(s).and_then(|c| c[1].parse::<i32>().ok()) {
            Some(year) => year,
            None => {
                debug!(value = s, "date has no 4-digit year");
                return None;
            }
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            debug!(value = s, year, "date has implausible year");
            return None;
        }

        let parsed = if ISO_DATE.is_match(s) {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        } else if ISO_DATETIME.is_match(s) {
            iso_datetime_local_date(s)
        } else if let Some(c) = SLASH_DMY_OR_MDY.captures(s) {
            let (month, day) = month_day_order(number(&c[1])?, number(&c[2])?);
            NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, day)
        } else if let Some(c) = SLASH_YMD.captures(s) {
            NaiveDate::from_ymd_opt(c[1].parse().ok()?, number(&c[2])?, number(&c[3])?)
        } else {
            debug!(value = s, "unsupported date format");
            return None;
        };

        if parsed.is_none() {
            debug!(value = s, "date is not a real calendar day");
        }
        parsed
    }
}

/// Read `(a, b)` as `(month, day)`, unless `a` can only be a day
fn month_day_order(a: u32, b: u32) -> (u32, u32) {
    if a > 12 {
        (b, a)
    } else {
        (a, b)
    }
}

fn number(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

/// Calendar date of an ISO date-time; zoned values are shifted to local time
fn iso_datetime_local_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

fn day_month_with_year(s: &str, row: &CsvRow) -> Option<NaiveDate> {
    let c = DAY_MONTH.captures(s)?;
    let year_key = resolve_metric_key(row, YEAR)?;
    let year = leading_integer(row.get(year_key)?)?;
    let (month, day) = month_day_order(number(&c[1])?, number(&c[2])?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Integer prefix of a cell, e.g. `"2024 (est)"` reads as 2024
fn leading_integer(raw: &str) -> Option<i32> {
    let s = raw.trim();
    let end = s
        .char_indices()
        .find(|(i, ch)| !(ch.is_ascii_digit() || (*i == 0 && (*ch == '-' || *ch == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::parse_csv;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn no_row() -> CsvRow {
        CsvRow::default()
    }

    #[test]
    fn test_iso_date_is_identity() {
        for s in ["2024-03-01", "2010-01-01", "2099-12-31", "2024-02-29"] {
            let out = DateNormalizer::normalize(s, &no_row()).unwrap();
            assert_eq!(out.to_string(), s);
        }
    }

    #[test]
    fn test_iso_datetime() {
        assert_eq!(
            DateNormalizer::normalize_value("2024-03-01T23:15:00"),
            Some(d(2024, 3, 1))
        );
        assert_eq!(
            DateNormalizer::normalize_value("2024-03-01T06:00"),
            Some(d(2024, 3, 1))
        );
        assert_eq!(
            DateNormalizer::normalize_value("2024-03-01T06:00:00.250"),
            Some(d(2024, 3, 1))
        );
    }

    #[test]
    fn test_iso_datetime_with_offset_uses_local_date() {
        let raw = "2024-03-01T12:00:00Z";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(DateNormalizer::normalize_value(raw), Some(expected));
    }

    #[test]
    fn test_slash_month_first_by_default() {
        assert_eq!(DateNormalizer::normalize_value("03/04/2024"), Some(d(2024, 3, 4)));
        assert_eq!(DateNormalizer::normalize_value("3/4/2024"), Some(d(2024, 3, 4)));
    }

    #[test]
    fn test_slash_day_first_when_unambiguous() {
        for day in 13..=28 {
            let raw = format!("{day}/02/2024");
            let out = DateNormalizer::normalize_value(&raw).unwrap();
            assert_eq!(out, d(2024, 2, day));
        }
    }

    #[test]
    fn test_slash_year_first() {
        assert_eq!(DateNormalizer::normalize_value("2024/3/1"), Some(d(2024, 3, 1)));
    }

    #[test]
    fn test_year_out_of_range_rejected() {
        assert_eq!(DateNormalizer::normalize_value("2009-12-31"), None);
        assert_eq!(DateNormalizer::normalize_value("2101-01-01"), None);
        assert_eq!(DateNormalizer::normalize_value("01/02/1999"), None);
    }

    #[test]
    fn test_unrecognized_rejected() {
        assert_eq!(DateNormalizer::normalize("N/A", &no_row()), None);
        assert_eq!(DateNormalizer::normalize("", &no_row()), None);
        assert_eq!(DateNormalizer::normalize_value("March 1, 2024"), None);
        assert_eq!(DateNormalizer::normalize_value("2024.03.01"), None);
    }

    #[test]
    fn test_impossible_day_rejected() {
        assert_eq!(DateNormalizer::normalize_value("2024-02-30"), None);
        assert_eq!(DateNormalizer::normalize_value("02/30/2024"), None);
    }

    #[test]
    fn test_day_month_with_year_column() {
        let rows = parse_csv("day,year,value\n15-3,2024,1\n3/4,2023,2\n15-3,,3\n");
        assert_eq!(DateNormalizer::normalize("15-3", &rows[0]), Some(d(2024, 3, 15)));
        assert_eq!(DateNormalizer::normalize("3/4", &rows[1]), Some(d(2023, 3, 4)));
        assert_eq!(DateNormalizer::normalize("15-3", &rows[2]), None);
    }

    #[test]
    fn test_day_month_without_year_column() {
        let rows = parse_csv("day,value\n15-3,1\n");
        assert_eq!(DateNormalizer::normalize("15-3", &rows[0]), None);
    }
}
