//! Percentage Utilities
//!
//! Clamping, display rounding and the integer normalization that forces a
//! segment mix to sum to exactly 100.

use crate::types::{Segment, SegmentMix};

/// Tolerance used when checking that a mix sums to 100
pub const MIX_TOLERANCE: f64 = 0.1;

/// Result of a mix total check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixValidation {
    pub total: f64,
    pub is_valid: bool,
}

/// Clamp into [0, 100]
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Percentage to fraction, clamped first
pub(crate) fn to_fraction(value: f64) -> f64 {
    clamp_percent(value) / 100.0
}

/// Round half up to the nearest integer (2.5 -> 3, -2.5 -> -2)
pub(crate) fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to the nearest 0.1 for display
pub fn round_to_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Check a mix sums to 100 within [`MIX_TOLERANCE`]
pub fn validate_mix(mix: &SegmentMix) -> MixValidation {
    validate_mix_with_tolerance(mix, MIX_TOLERANCE)
}

pub fn validate_mix_with_tolerance(mix: &SegmentMix, tolerance: f64) -> MixValidation {
    let total = mix.total();
    MixValidation {
        total,
        is_valid: (total - 100.0).abs() < tolerance,
    }
}

/// Round every segment to a whole number and push the remainder onto the
/// largest segment so the mix sums to 100.
///
/// Ties for largest go to the first segment in fixed order. The adjusted
/// segment is clamped into [0, 100]; if that clamp bites the result will not
/// sum to 100 and no second pass is made.
pub fn normalize_segment_mix(mix: &SegmentMix) -> SegmentMix {
    let mut rounded = SegmentMix::zero();
    for segment in Segment::ALL {
        rounded.set(segment, round_half_up(mix.get(segment)));
    }

    let diff = 100.0 - rounded.total();
    if diff != 0.0 {
        let mut largest = Segment::Casual;
        for segment in Segment::ALL {
            if rounded.get(segment) > rounded.get(largest) {
                largest = segment;
            }
        }
        let adjusted = clamp_percent(rounded.get(largest) + diff);
        rounded.set(largest, adjusted);
    }

    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-10.0), 0.0);
        assert_eq!(clamp_percent(0.0), 0.0);
        assert_eq!(clamp_percent(50.0), 50.0);
        assert_eq!(clamp_percent(100.0), 100.0);
        assert_eq!(clamp_percent(150.0), 100.0);
    }

    #[test]
    fn test_round_to_one_decimal() {
        assert_relative_eq!(round_to_one_decimal(10.123), 10.1);
        assert_relative_eq!(round_to_one_decimal(10.156), 10.2);
        assert_relative_eq!(round_to_one_decimal(10.15), 10.2);
        assert_relative_eq!(round_to_one_decimal(10.1), 10.1);
    }

    #[test]
    fn test_round_half_up_on_negatives() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
    }

    #[test]
    fn test_validate_mix() {
        let valid = validate_mix(&SegmentMix::uniform(20.0));
        assert!(valid.is_valid);
        assert_eq!(valid.total, 100.0);

        let short = validate_mix(&SegmentMix::new(20.0, 20.0, 20.0, 20.0, 10.0));
        assert!(!short.is_valid);
        assert_eq!(short.total, 90.0);

        // Inside the 0.1 tolerance
        let close = validate_mix(&SegmentMix::new(20.0, 20.0, 20.0, 20.0, 19.95));
        assert!(close.is_valid);

        let off_by_tenth = validate_mix(&SegmentMix::new(20.0, 20.0, 20.0, 20.0, 19.9));
        assert!(!off_by_tenth.is_valid);
    }

    #[test]
    fn test_normalize_pushes_remainder_to_largest() {
        // 33.4 + 33.3 + 33.3 rounds to 99, largest (first) absorbs +1
        let mix = SegmentMix::new(33.4, 33.3, 33.3, 0.0, 0.0);
        let normalized = normalize_segment_mix(&mix);

        assert_eq!(normalized, SegmentMix::new(34.0, 33.0, 33.0, 0.0, 0.0));
        assert_eq!(normalized.total(), 100.0);
    }

    #[test]
    fn test_normalize_tie_goes_to_first_segment() {
        let mix = SegmentMix::new(10.0, 40.0, 10.0, 40.0, 0.0);
        let normalized = normalize_segment_mix(&mix);

        assert_eq!(normalized.upscale_casual, 40.0);
        assert_eq!(normalized.bar, 40.0);
        assert_eq!(normalized.casual, 10.0);
        // 100 - 100 = 0, untouched
        assert_eq!(normalized.total(), 100.0);

        let short = normalize_segment_mix(&SegmentMix::new(10.0, 40.0, 5.0, 40.0, 0.0));
        assert_eq!(short.upscale_casual, 45.0);
        assert_eq!(short.bar, 40.0);
    }

    #[test]
    fn test_normalize_empty_mix_fills_casual() {
        let normalized = normalize_segment_mix(&SegmentMix::zero());
        assert_eq!(normalized, SegmentMix::new(100.0, 0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_normalize_overflow_is_not_corrected() {
        // Sum 150; largest (60) would need -50 -> 10, fine.
        let shrink = normalize_segment_mix(&SegmentMix::new(60.0, 40.0, 30.0, 10.0, 10.0));
        assert_eq!(shrink.total(), 100.0);
        assert_eq!(shrink.casual, 10.0);

        // Sum 250; largest (60) would need -150 -> clamped to 0, total stays 190
        let overflow = normalize_segment_mix(&SegmentMix::new(60.0, 50.0, 50.0, 50.0, 40.0));
        assert_eq!(overflow.casual, 0.0);
        assert_eq!(overflow.total(), 190.0);
    }
}
