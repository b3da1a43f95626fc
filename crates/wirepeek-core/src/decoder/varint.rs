//! Heuristic classification of varint values.
//!
//! Values that fall inside two windows are shown as Unix timestamps. The
//! windows cover roughly 2014 to 2017 and are tunable, not part of the wire
//! format.

use chrono::{DateTime, Utc};
use std::ops::Range;

/// Exclusive window for timestamps stored with three extra decimal digits
pub const MICROSECOND_WINDOW: Range<u64> = 1_400_000_000_000..1_500_000_000_000;

/// Exclusive window for timestamps stored as whole seconds
pub const SECOND_WINDOW: Range<u64> = 1_400_000_000..1_500_000_000;

/// How a varint value should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintClass {
    /// Value in [`MICROSECOND_WINDOW`], divided by 1000 to get seconds
    MicrosecondTimestamp(DateTime<Utc>),
    /// Value in [`SECOND_WINDOW`], used directly as seconds
    SecondTimestamp(DateTime<Utc>),
    /// Plain integer that fits in `i64`
    Integer,
    /// Plain integer whose signed reading is negative
    Ambiguous,
}

fn strictly_inside(window: &Range<u64>, value: u64) -> bool {
    value > window.start && value < window.end
}

/// Classify a decoded varint value
pub fn classify_varint(value: u64) -> VarintClass {
    if strictly_inside(&MICROSECOND_WINDOW, value) {
        if let Some(time) = DateTime::<Utc>::from_timestamp((value / 1000) as i64, 0) {
            return VarintClass::MicrosecondTimestamp(time);
        }
    }

    if strictly_inside(&SECOND_WINDOW, value) {
        if let Some(time) = DateTime::<Utc>::from_timestamp(value as i64, 0) {
            return VarintClass::SecondTimestamp(time);
        }
    }

    if i64::try_from(value).is_ok() {
        VarintClass::Integer
    } else {
        VarintClass::Ambiguous
    }
}

/// Render both readings of a varint: `"<signed> OR <unsigned>"`
pub(crate) fn dual_reading(value: u64) -> String {
    format!("{} OR {}", value as i64, value)
}
