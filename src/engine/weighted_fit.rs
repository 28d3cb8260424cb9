//! Weighted Fit
//!
//! Dot product of a product's per-segment fit against a customer mix.
//!
//! Two flavours exist:
//! - [`compute_weighted_fit`] clamps both vectors into [0, 100] and works in
//!   fractions (used by the unweighted fallback path)
//! - [`weighted_fit_pct`] multiplies raw percentages and divides once by 100
//!   (used per country by the attach/penetration engine)

use crate::types::{Product, Segment, SegmentMix};
use crate::utils::percent::to_fraction;

/// Fit score (0-100) of a product against a segment mix
///
/// Each segment contributes `mix% * fit%`; the result is 100 at most when the
/// mix sums to 100 and every fit is 100.
pub fn compute_weighted_fit(product: &Product, mix: &SegmentMix) -> f64 {
    Segment::ALL
        .iter()
        .map(|&segment| to_fraction(mix.get(segment)) * to_fraction(product.fit_by_segment.get(segment)))
        .sum::<f64>()
        * 100.0
}

/// `sum(fit[s] * mix[s]) / 100` over raw, unclamped percentages
pub fn weighted_fit_pct(segment_fit: &SegmentMix, mix: &SegmentMix) -> f64 {
    Segment::ALL
        .iter()
        .map(|&segment| segment_fit.get(segment) * mix.get(segment))
        .sum::<f64>()
        / 100.0
}
