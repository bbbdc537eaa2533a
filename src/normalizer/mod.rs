//! Value normalization
//!
//! Reduces the date and duration spellings found in vendor exports to
//! calendar dates and minutes.

mod date;
mod duration;

pub use date::{DateNormalizer, MAX_YEAR, MIN_YEAR};
pub use duration::DurationNormalizer;
