//! Mix Aggregator
//!
//! Collapses a per-region table of segment mixes into one blended mix.
//!
//! Algorithm:
//! 1. With population totals (sum > 0): each region contributes
//!    `locations * value / total_locations` per segment, then the blend is
//!    normalized to whole numbers summing to 100
//! 2. Otherwise: plain arithmetic mean over the regions present, no
//!    normalization

use crate::types::{CountryTotals, RegionMix, Segment, SegmentMix};
use crate::utils::percent::normalize_segment_mix;

/// Blend a region mix into one segment mix
pub fn aggregate_region_mix(region_mix: &RegionMix, country_totals: Option<&CountryTotals>) -> SegmentMix {
    if let Some(totals) = country_totals {
        let total_locations = totals.total();
        if total_locations > 0 {
            return compute_weighted_segment_mix(region_mix, totals, total_locations as f64);
        }
    }

    simple_average(region_mix)
}

/// Population-weighted blend, normalized to sum to 100
pub fn compute_weighted_segment_mix(
    region_mix: &RegionMix,
    country_totals: &CountryTotals,
    total_locations: f64,
) -> SegmentMix {
    let mut weighted = SegmentMix::zero();
    if total_locations == 0.0 {
        return weighted;
    }

    for (region, mix) in region_mix.iter() {
        let locations = country_totals.get(region) as f64;
        for segment in Segment::ALL {
            *weighted.get_mut(segment) += locations * mix.get(segment) / total_locations;
        }
    }

    normalize_segment_mix(&weighted)
}

fn simple_average(region_mix: &RegionMix) -> SegmentMix {
    let mut aggregated = SegmentMix::zero();
    if region_mix.is_empty() {
        return aggregated;
    }

    for mix in region_mix.values() {
        for segment in Segment::ALL {
            *aggregated.get_mut(segment) += mix.get(segment);
        }
    }

    let region_count = region_mix.len() as f64;
    for segment in Segment::ALL {
        *aggregated.get_mut(segment) /= region_count;
    }

    aggregated
}
