//! Numeric reinterpretation of fixed-width payloads.
//!
//! The same 8 (or 4) bytes are read as a float, a signed integer and an
//! unsigned integer in both byte orders. Big-endian readings are included
//! because the input may not be protobuf at all.

use bytes::Buf;

/// Readings at or below this magnitude are treated as noise (zero, denormals).
pub const PLAUSIBLE_MAGNITUDE: f64 = 0.01;

/// One reading of a fixed-width payload
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Short encoding name, e.g. `doublele`
    pub label: &'static str,
    /// Absolute numeric value used for ranking
    pub magnitude: f64,
    /// Rendered value
    pub text: String,
}

impl Candidate {
    fn float(label: &'static str, value: f64) -> Self {
        Self {
            label,
            magnitude: value.abs(),
            text: format!("{value:.6}"),
        }
    }

    fn float32(label: &'static str, value: f32) -> Self {
        Self {
            label,
            magnitude: f64::from(value).abs(),
            text: format!("{value:.6}"),
        }
    }

    fn signed(label: &'static str, value: i64) -> Self {
        Self {
            label,
            magnitude: (value as f64).abs(),
            text: value.to_string(),
        }
    }

    fn unsigned(label: &'static str, value: u64) -> Self {
        Self {
            label,
            magnitude: value as f64,
            text: value.to_string(),
        }
    }
}

/// All six readings of an 8-byte payload, in ranking order
pub fn fixed64_candidates(bytes: [u8; 8]) -> [Candidate; 6] {
    let raw = || &bytes[..];
    [
        Candidate::float("doublebe", raw().get_f64()),
        Candidate::float("doublele", raw().get_f64_le()),
        Candidate::signed("int64be", raw().get_i64()),
        Candidate::signed("int64le", raw().get_i64_le()),
        Candidate::unsigned("uint64be", raw().get_u64()),
        Candidate::unsigned("uint64le", raw().get_u64_le()),
    ]
}

/// All six readings of a 4-byte payload, in ranking order
pub fn fixed32_candidates(bytes: [u8; 4]) -> [Candidate; 6] {
    let raw = || &bytes[..];
    [
        Candidate::float32("floatbe", raw().get_f32()),
        Candidate::float32("floatle", raw().get_f32_le()),
        Candidate::signed("int32be", i64::from(raw().get_i32())),
        Candidate::signed("int32le", i64::from(raw().get_i32_le())),
        Candidate::unsigned("uint32be", u64::from(raw().get_u32())),
        Candidate::unsigned("uint32le", u64::from(raw().get_u32_le())),
    ]
}

/// Picks the smallest reading whose magnitude is above [`PLAUSIBLE_MAGNITUDE`].
///
/// NaN and infinite readings never win. Ties go to the earlier candidate.
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;

    for candidate in candidates {
        let closest = best.map_or(f64::MAX, |b| b.magnitude);
        if candidate.magnitude > PLAUSIBLE_MAGNITUDE && candidate.magnitude < closest {
            best = Some(candidate);
        }
    }

    best
}
