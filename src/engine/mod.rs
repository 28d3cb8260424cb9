//! Calculation engine
//!
//! Each stage lives in its own module:
//! - `mix_aggregator`: blend per-region mixes into one
//! - `weighted_fit`: product fit against a mix
//! - `country_rows`: per-country shares and mixes
//! - `attach_penetration`: the market-weighted rollup
//!
//! The public entry points pick between two paths:
//! - with population totals: per-country rollup with coverage discount
//! - without: one fit against the simple-averaged mix, no discount

pub mod attach_penetration;
pub mod country_rows;
pub mod mix_aggregator;
pub mod weighted_fit;

pub use attach_penetration::{
    predict_attach_and_penetration, Coverage, MarketSelection, Prediction, ProductProfile,
};
pub use country_rows::{build_country_rows, CountryRow};
pub use mix_aggregator::{aggregate_region_mix, compute_weighted_segment_mix};
pub use weighted_fit::{compute_weighted_fit, weighted_fit_pct};

use crate::config::EngineConfig;
use crate::types::{CountryTotals, Product, RegionMix};
use crate::utils::percent::clamp_percent;

/// Totals usable for population weighting
fn usable_totals(country_totals: Option<&CountryTotals>) -> Option<&CountryTotals> {
    country_totals.filter(|totals| !totals.is_empty())
}

/// Predicted attach % (net-new customers)
///
/// `current_mix` defaults to `new_mix` when building country rows.
pub fn compute_attach(
    product: &Product,
    new_mix: &RegionMix,
    country_totals: Option<&CountryTotals>,
    current_mix: Option<&RegionMix>,
) -> f64 {
    compute_attach_with(&EngineConfig::DEFAULT, product, new_mix, country_totals, current_mix)
}

/// Predicted penetration % (existing customers)
///
/// `new_mix` defaults to `current_mix` when building country rows.
pub fn compute_penetration(
    product: &Product,
    current_mix: &RegionMix,
    country_totals: Option<&CountryTotals>,
    new_mix: Option<&RegionMix>,
) -> f64 {
    compute_penetration_with(&EngineConfig::DEFAULT, product, current_mix, country_totals, new_mix)
}

pub fn compute_attach_with(
    config: &EngineConfig,
    product: &Product,
    new_mix: &RegionMix,
    country_totals: Option<&CountryTotals>,
    current_mix: Option<&RegionMix>,
) -> f64 {
    match usable_totals(country_totals) {
        Some(totals) => {
            let rows = build_country_rows(current_mix.unwrap_or(new_mix), new_mix, totals);
            predict_attach_and_penetration(&ProductProfile::from_product(product), &rows, config).attach_pct
        }
        None => fallback_attach(config, product, new_mix),
    }
}

pub fn compute_penetration_with(
    config: &EngineConfig,
    product: &Product,
    current_mix: &RegionMix,
    country_totals: Option<&CountryTotals>,
    new_mix: Option<&RegionMix>,
) -> f64 {
    match usable_totals(country_totals) {
        Some(totals) => {
            let rows = build_country_rows(current_mix, new_mix.unwrap_or(current_mix), totals);
            predict_attach_and_penetration(&ProductProfile::from_product(product), &rows, config)
                .penetration_pct
        }
        None => fallback_penetration(config, product, current_mix),
    }
}

/// Both rates in one pass
///
/// Coverage is `None` on the unweighted fallback path.
pub fn predict_product(
    config: &EngineConfig,
    product: &Product,
    current_mix: &RegionMix,
    new_mix: &RegionMix,
    country_totals: Option<&CountryTotals>,
) -> (Prediction, Option<Coverage>) {
    match usable_totals(country_totals) {
        Some(totals) => {
            let rows = build_country_rows(current_mix, new_mix, totals);
            let prediction = predict_attach_and_penetration(&ProductProfile::from_product(product), &rows, config);
            (prediction, Some(prediction.coverage))
        }
        None => {
            let prediction = Prediction {
                attach_pct: fallback_attach(config, product, new_mix),
                penetration_pct: fallback_penetration(config, product, current_mix),
                coverage: Coverage::default(),
            };
            (prediction, None)
        }
    }
}

fn fallback_attach(config: &EngineConfig, product: &Product, new_mix: &RegionMix) -> f64 {
    let attach = match product.attach_anchor() {
        Some(rate) => rate * config.anchor_uplift,
        None => compute_weighted_fit(product, &aggregate_region_mix(new_mix, None)),
    };
    clamp_percent(attach)
}

fn fallback_penetration(config: &EngineConfig, product: &Product, current_mix: &RegionMix) -> f64 {
    let backbook = product.backbook_multiplier.unwrap_or(1.0);
    let complexity = config.complexity_factors.factor(product.complexity);
    let base = match product.attach_anchor() {
        Some(rate) => rate,
        None => compute_weighted_fit(product, &aggregate_region_mix(current_mix, None)),
    };
    clamp_percent(base * backbook * complexity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComplexityLevel, Region, SegmentMix};
    use approx::assert_relative_eq;

    fn product() -> Product {
        Product::new("1", "Test Category", "Test Product").with_fit(SegmentMix::new(50.0, 30.0, 20.0, 10.0, 40.0))
    }

    #[test]
    fn test_fallback_when_totals_missing_or_empty() {
        let mix = RegionMix::uniform(SegmentMix::uniform(20.0));

        assert_relative_eq!(compute_penetration(&product(), &mix, None, None), 30.0, epsilon = 1e-9);
        let empty = CountryTotals::new();
        assert_relative_eq!(compute_penetration(&product(), &mix, Some(&empty), None), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_anchor_and_friction() {
        let mut p = product();
        p.current_attach_rate = Some(40.0);
        p.backbook_multiplier = Some(0.5);
        p.complexity = Some(ComplexityLevel::High);
        let mix = RegionMix::uniform(SegmentMix::uniform(20.0));

        assert_relative_eq!(compute_attach(&p, &mix, None, None), 44.0, epsilon = 1e-9);
        // 40 * 0.5 * 0.3
        assert_relative_eq!(compute_penetration(&p, &mix, None, None), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_anchor_uplift_is_clamped() {
        let mut p = product();
        p.current_attach_rate = Some(99.0);
        let mix = RegionMix::uniform(SegmentMix::uniform(20.0));

        assert_eq!(compute_attach(&p, &mix, None, None), 100.0);
    }

    #[test]
    fn test_attach_uses_new_mix_and_penetration_uses_current_mix() {
        let current = RegionMix::uniform(SegmentMix::uniform(20.0));
        let new = RegionMix::uniform(SegmentMix::new(15.0, 15.0, 10.0, 10.0, 50.0));
        let totals: CountryTotals = Region::ALL.iter().map(|&r| (r, 50)).collect();

        let attach = compute_attach(&product(), &new, Some(&totals), Some(&current));
        let penetration = compute_penetration(&product(), &current, Some(&totals), Some(&new));

        assert_relative_eq!(attach, 35.0, epsilon = 1e-9);
        assert_relative_eq!(penetration, 30.0, epsilon = 1e-9);

        let (both, coverage) = predict_product(&EngineConfig::DEFAULT, &product(), &current, &new, Some(&totals));
        assert_relative_eq!(both.attach_pct, attach, epsilon = 1e-12);
        assert_relative_eq!(both.penetration_pct, penetration, epsilon = 1e-12);
        assert_relative_eq!(coverage.unwrap().base, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_other_cohort_mix_reuses_the_given_one() {
        let new = RegionMix::uniform(SegmentMix::new(15.0, 15.0, 10.0, 10.0, 50.0));
        let totals: CountryTotals = Region::ALL.iter().map(|&r| (r, 50)).collect();

        assert_relative_eq!(compute_penetration(&product(), &new, Some(&totals), None), 35.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_has_no_coverage() {
        let mix = RegionMix::uniform(SegmentMix::uniform(20.0));
        let (_, coverage) = predict_product(&EngineConfig::DEFAULT, &product(), &mix, &mix, None);
        assert!(coverage.is_none());
    }
}
