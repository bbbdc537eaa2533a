//! Ordered fallback over optional values
//!
//! Both snapshot merging (earlier source wins) and insight reconciliation
//! (manual entry wins over device data) pick the first usable candidate from
//! an ordered list.

/// First present value, in candidate order
pub fn first_present<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    candidates.into_iter().flatten().next()
}

/// First present value that is a number (not NaN)
pub fn first_numeric<I>(candidates: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    first_present(candidates.into_iter().map(|c| c.filter(|v| !v.is_nan())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_prefers_earlier() {
        assert_eq!(first_present([Some(10), Some(99)]), Some(10));
        assert_eq!(first_present([None, Some(42)]), Some(42));
        assert_eq!(first_present::<i32, _>([None, None]), None);
        assert_eq!(first_present::<i32, _>(Vec::new()), None);
    }

    #[test]
    fn test_first_numeric_skips_nan() {
        assert_eq!(first_numeric([Some(f64::NAN), Some(8.0)]), Some(8.0));
        assert_eq!(first_numeric([Some(6.0), Some(8.0)]), Some(6.0));
        assert_eq!(first_numeric([None, Some(f64::NAN)]), None);
    }
}
