//! Country Row Builder
//!
//! One row per fixed region carrying its population shares and both segment
//! mixes. Rows are rebuilt on every calculation.

use serde::Serialize;

use crate::types::{CountryTotals, Region, RegionMix, SegmentMix};

/// Per-country input to the attach/penetration engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRow {
    pub region: Region,
    pub code: &'static str,
    pub label: &'static str,
    /// % of total existing locations (0-100)
    pub base_share: f64,
    /// % of total net-new locations (0-100)
    pub new_share: f64,
    pub current_mix: SegmentMix,
    pub new_mix: SegmentMix,
}

/// Build rows for all ten regions
///
/// Net-new population is taken to be the same size as the existing base, so
/// `new_share` always equals `base_share`. Regions missing from a mix get an
/// all-zero mix.
pub fn build_country_rows(
    current_mix: &RegionMix,
    new_mix: &RegionMix,
    country_totals: &CountryTotals,
) -> Vec<CountryRow> {
    let total_base = country_totals.total() as f64;
    let total_new = total_base;

    Region::ALL
        .iter()
        .map(|&region| {
            let locations = country_totals.get(region) as f64;
            let base_share = if total_base > 0.0 { locations / total_base * 100.0 } else { 0.0 };
            let new_share = if total_new > 0.0 { locations / total_new * 100.0 } else { 0.0 };

            CountryRow {
                region,
                code: region.code(),
                label: region.label(),
                base_share,
                new_share,
                current_mix: current_mix.get(region),
                new_mix: new_mix.get(region),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shares_follow_population() {
        let totals: CountryTotals = [(Region::Uk, 750), (Region::France, 250)].into_iter().collect();
        let mix = RegionMix::uniform(SegmentMix::uniform(20.0));

        let rows = build_country_rows(&mix, &mix, &totals);
        assert_eq!(rows.len(), 10);

        let uk = rows.iter().find(|r| r.region == Region::Uk).unwrap();
        assert_relative_eq!(uk.base_share, 75.0);
        assert_relative_eq!(uk.new_share, 75.0);
        assert_eq!(uk.code, "GB");

        let malta = rows.iter().find(|r| r.region == Region::Malta).unwrap();
        assert_eq!(malta.base_share, 0.0);

        let share_sum: f64 = rows.iter().map(|r| r.base_share).sum();
        assert_relative_eq!(share_sum, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_population_gives_zero_shares() {
        let rows = build_country_rows(&RegionMix::new(), &RegionMix::new(), &CountryTotals::new());
        assert!(rows.iter().all(|r| r.base_share == 0.0 && r.new_share == 0.0));
        assert!(rows.iter().all(|r| r.current_mix == SegmentMix::zero()));
    }

    #[test]
    fn test_rows_keep_each_cohort_mix() {
        let current = RegionMix::uniform(SegmentMix::uniform(20.0));
        let new = RegionMix::uniform(SegmentMix::new(15.0, 15.0, 10.0, 10.0, 50.0));
        let totals: CountryTotals = [(Region::Germany, 10)].into_iter().collect();

        let rows = build_country_rows(&current, &new, &totals);
        let germany = &rows[Region::Germany.index()];
        assert_eq!(germany.current_mix.casual, 20.0);
        assert_eq!(germany.new_mix.quick_serve, 50.0);
    }
}
