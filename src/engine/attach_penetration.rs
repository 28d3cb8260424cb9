//! Attach / Penetration Engine
//!
//! Turns a product profile and the per-country rows into two rates:
//! - Attach: adoption potential among net-new customers
//! - Penetration: sell-into potential among existing customers
//!
//! Algorithm:
//! 1. Keep the countries in the product's market (all when unrestricted);
//!    none left means all-zero output
//! 2. Resolve backbook friction (default 1.0) and the complexity factor
//! 3. Normalize share weights over the selected countries (0 sums become 1)
//! 4. Per country:
//!    - attach = anchor * uplift, or fit against the net-new mix
//!    - penetration = (anchor or fit against the current mix) * backbook * complexity
//!    - accumulate weighted by the country's share of the selection
//! 5. Coverage = summed shares of the selection (% of the whole population)
//! 6. Scale the within-market rates by coverage / 100, clamp into [0, 100]

use serde::Serialize;
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::engine::country_rows::CountryRow;
use crate::engine::weighted_fit::weighted_fit_pct;
use crate::types::{ComplexityLevel, Product, SegmentMix};
use crate::utils::percent::clamp_percent;

/// Countries a product applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketSelection {
    All,
    /// ISO country codes
    Countries(Vec<&'static str>),
}

impl MarketSelection {
    fn includes(&self, code: &str) -> bool {
        match self {
            MarketSelection::All => true,
            MarketSelection::Countries(codes) => codes.iter().any(|c| *c == code),
        }
    }
}

/// Engine view of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductProfile {
    pub segment_fit: SegmentMix,
    pub complexity: Option<ComplexityLevel>,
    pub current_attach_rate: Option<f64>,
    pub backbook_multiplier: Option<f64>,
    pub market: MarketSelection,
}

impl ProductProfile {
    pub fn from_product(product: &Product) -> Self {
        let market = if product.market_relevance.is_empty() {
            MarketSelection::All
        } else {
            MarketSelection::Countries(product.market_relevance.iter().map(|r| r.code()).collect())
        };

        Self {
            segment_fit: product.fit_by_segment,
            complexity: product.complexity,
            current_attach_rate: product.current_attach_rate,
            backbook_multiplier: product.backbook_multiplier,
            market,
        }
    }

    fn anchor(&self) -> Option<f64> {
        self.current_attach_rate.filter(|rate| *rate > 0.0)
    }
}

/// Share of the total population a market represents
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coverage {
    /// % of net-new locations covered
    pub new: f64,
    /// % of existing locations covered
    pub base: f64,
}

/// Engine output for one product
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub attach_pct: f64,
    pub penetration_pct: f64,
    pub coverage: Coverage,
}

/// Predict attach and penetration for one product across countries
pub fn predict_attach_and_penetration(
    profile: &ProductProfile,
    countries: &[CountryRow],
    config: &EngineConfig,
) -> Prediction {
    let selected: SmallVec<[&CountryRow; 10]> = countries
        .iter()
        .filter(|c| profile.market.includes(c.code))
        .collect();

    if selected.is_empty() {
        tracing::trace!("No countries match market selection {:?}", profile.market);
        return Prediction::default();
    }

    let backbook = profile.backbook_multiplier.unwrap_or(1.0);
    let complexity = config.complexity_factors.factor(profile.complexity);
    let anchor = profile.anchor();

    let coverage = Coverage {
        new: selected.iter().map(|c| c.new_share).sum(),
        base: selected.iter().map(|c| c.base_share).sum(),
    };
    let total_new = if coverage.new == 0.0 { 1.0 } else { coverage.new };
    let total_base = if coverage.base == 0.0 { 1.0 } else { coverage.base };

    let mut attach_sum = 0.0;
    let mut penetration_sum = 0.0;

    for country in &selected {
        let attach_country = match anchor {
            Some(rate) => rate * config.anchor_uplift,
            None => weighted_fit_pct(&profile.segment_fit, &country.new_mix),
        };

        let penetration_country = match anchor {
            Some(rate) => rate * backbook * complexity,
            None => weighted_fit_pct(&profile.segment_fit, &country.current_mix) * backbook * complexity,
        };

        attach_sum += attach_country * (country.new_share / total_new);
        penetration_sum += penetration_country * (country.base_share / total_base);
    }

    Prediction {
        attach_pct: clamp_percent(attach_sum * (coverage.new / 100.0)),
        penetration_pct: clamp_percent(penetration_sum * (coverage.base / 100.0)),
        coverage,
    }
}
