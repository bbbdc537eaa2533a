//! Duration normalization
//!
//! Durations arrive as raw seconds, clock strings (`H:MM` or `H:MM:SS`), or
//! word forms such as `7.5h` and `45 min`.

use once_cell::sync::Lazy;
use regex::Regex;

static SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid pattern"));
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid pattern"));
static HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*h").expect("valid pattern"));
static MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*min").expect("valid pattern"));

/// Normalizer for vendor duration strings
pub struct DurationNormalizer;

impl DurationNormalizer {
    /// Whole minutes from any supported duration form
    pub fn to_minutes(raw: &str) -> Option<i64> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Some(secs) = Self::to_seconds(s) {
            return Some(round_minutes(secs / 60.0));
        }
        if let Some(hours) = first_number(&HOURS, s) {
            return Some(round_minutes(hours * 60.0));
        }
        first_number(&MINUTES, s).map(round_minutes)
    }

    /// Seconds from a bare number (already seconds) or an `H:MM[:SS]` clock.
    /// Word forms are not recognized here.
    pub fn to_seconds(raw: &str) -> Option<f64> {
        let s = raw.trim();
        if SECONDS.is_match(s) {
            return s.parse::<f64>().ok().filter(|v| v.is_finite());
        }
        let c = CLOCK.captures(s)?;
        let hours: f64 = c[1].parse().ok()?;
        let minutes: f64 = c[2].parse().ok()?;
        let seconds: f64 = match c.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0.0,
        };
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    }
}

fn first_number(pattern: &Regex, s: &str) -> Option<f64> {
    pattern
        .captures(s)
        .and_then(|c| c[1].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn round_minutes(minutes: f64) -> i64 {
    minutes.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds() {
        assert_eq!(DurationNormalizer::to_minutes("27000"), Some(450));
        assert_eq!(DurationNormalizer::to_minutes("89"), Some(1));
        assert_eq!(DurationNormalizer::to_minutes("90"), Some(2));
        assert_eq!(DurationNormalizer::to_minutes("600.0"), Some(10));
    }

    #[test]
    fn test_clock_hms_matches_formula() {
        for (h, m, s) in [(7, 30, 0), (0, 15, 0), (8, 59, 59), (1, 0, 29), (0, 0, 30)] {
            let raw = format!("{h}:{m:02}:{s:02}");
            let expected = ((h * 3600 + m * 60 + s) as f64 / 60.0).round() as i64;
            assert_eq!(DurationNormalizer::to_minutes(&raw), Some(expected), "{raw}");
        }
        assert_eq!(DurationNormalizer::to_minutes("07:30:00"), Some(450));
    }

    #[test]
    fn test_clock_hours_minutes() {
        assert_eq!(DurationNormalizer::to_seconds("7:30"), Some(27000.0));
        assert_eq!(DurationNormalizer::to_minutes("7:30"), Some(450));
        assert_eq!(DurationNormalizer::to_minutes("0:45"), Some(45));
    }

    #[test]
    fn test_word_forms() {
        assert_eq!(DurationNormalizer::to_minutes("7h"), Some(420));
        assert_eq!(DurationNormalizer::to_minutes("7.5 H"), Some(450));
        assert_eq!(DurationNormalizer::to_minutes("45 min"), Some(45));
        assert_eq!(DurationNormalizer::to_minutes("44.6min"), Some(45));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(DurationNormalizer::to_minutes(""), None);
        assert_eq!(DurationNormalizer::to_minutes("   "), None);
        assert_eq!(DurationNormalizer::to_minutes("--"), None);
        assert_eq!(DurationNormalizer::to_seconds("7h"), None);
    }
}
