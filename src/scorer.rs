//! Catalog Scorer - batch attach/penetration for a whole workspace
//!
//! Scores every product against the workspace mixes in parallel (Rayon),
//! preserving catalog order. Results are memoised per product fingerprint for
//! the most recent market only, so repeated scoring of an unchanged catalog is
//! a lookup and editing a mix drops the stale entries.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use crate::config::EngineConfig;
use crate::engine::{predict_product, Coverage, Prediction};
use crate::store::{AppState, SavedVersion};
use crate::types::{CountryTotals, Product, RegionMix, SegmentMix};
use crate::utils::percent::round_to_one_decimal;

/// One row of the results table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductScore {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub attach: f64,
    pub penetration: f64,
    /// `None` when scored without population totals
    pub coverage: Option<Coverage>,
}

impl ProductScore {
    pub fn display_attach(&self) -> f64 {
        round_to_one_decimal(self.attach)
    }

    pub fn display_penetration(&self) -> f64 {
        round_to_one_decimal(self.penetration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Category,
    Attach,
    Penetration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

type CachedResult = (Prediction, Option<Coverage>);

/// Memo for one market fingerprint at a time
#[derive(Default)]
struct ScoreCache {
    market: Option<u64>,
    entries: FxHashMap<u64, CachedResult>,
}

impl ScoreCache {
    fn get(&self, market: u64, product: u64) -> Option<CachedResult> {
        if self.market != Some(market) {
            return None;
        }
        self.entries.get(&product).copied()
    }

    fn insert(&mut self, market: u64, product: u64, result: CachedResult) {
        if self.market != Some(market) {
            if !self.entries.is_empty() {
                tracing::debug!("Market changed, dropping {} cached results", self.entries.len());
            }
            self.entries.clear();
            self.market = Some(market);
        }
        self.entries.insert(product, result);
    }
}

/// Market inputs shared by every product in a batch
struct Market<'a> {
    current_mix: &'a RegionMix,
    new_mix: &'a RegionMix,
    totals: Option<&'a CountryTotals>,
    fingerprint: u64,
}

impl<'a> Market<'a> {
    fn new(current_mix: &'a RegionMix, new_mix: &'a RegionMix, totals: Option<&'a CountryTotals>) -> Self {
        let mut hasher = FxHasher::default();
        hash_region_mix(current_mix, &mut hasher);
        hash_region_mix(new_mix, &mut hasher);
        totals.hash(&mut hasher);

        Self {
            current_mix,
            new_mix,
            totals,
            fingerprint: hasher.finish(),
        }
    }
}

pub struct CatalogScorer {
    config: EngineConfig,
    cache: Mutex<ScoreCache>,
}

impl Default for CatalogScorer {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT)
    }
}

impl CatalogScorer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(ScoreCache::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score the whole catalog
    ///
    /// Returns `None` when either mix has a region that does not sum to 100.
    pub fn score_all(&self, state: &AppState) -> Option<Vec<ProductScore>> {
        if !state.can_calculate(self.config.mix_tolerance) {
            tracing::warn!("Customer mixes do not sum to 100%, skipping calculation");
            return None;
        }

        let market = Market::new(&state.current_mix, &state.new_mix, state.country_totals_opt());
        tracing::debug!(
            "Scoring {} products ({})",
            state.products.len(),
            if market.totals.is_some() { "population weighted" } else { "unweighted" }
        );

        let scores = state
            .products
            .par_iter()
            .map(|product| self.score_in_market(product, &market))
            .collect();

        Some(scores)
    }

    /// Score one product against the workspace, ignoring the mix gate
    pub fn score_product(&self, product: &Product, state: &AppState) -> ProductScore {
        let market = Market::new(&state.current_mix, &state.new_mix, state.country_totals_opt());
        self.score_in_market(product, &market)
    }

    /// Score a product by name as it stood in a saved version
    ///
    /// Uses the version's mixes and its own totals when it has any, else
    /// `fallback_totals`.
    pub fn score_in_version(
        &self,
        product_name: &str,
        version: &SavedVersion,
        fallback_totals: Option<&CountryTotals>,
    ) -> Option<ProductScore> {
        let snapshot = &version.state;
        let product = snapshot.products.iter().find(|p| p.name == product_name)?;

        let totals = if snapshot.country_totals.is_empty() {
            fallback_totals.filter(|t| !t.is_empty())
        } else {
            Some(&snapshot.country_totals)
        };

        let market = Market::new(&snapshot.current_mix, &snapshot.new_mix, totals);
        Some(self.score_in_market(product, &market))
    }

    pub fn cached_results(&self) -> usize {
        self.cache.lock().map(|cache| cache.entries.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = ScoreCache::default();
        }
    }

    fn score_in_market(&self, product: &Product, market: &Market<'_>) -> ProductScore {
        let key = product_fingerprint(product);

        let cached = self.cache.lock().ok().and_then(|cache| cache.get(market.fingerprint, key));
        let (prediction, coverage) = match cached {
            Some(hit) => hit,
            None => {
                let result = predict_product(
                    &self.config,
                    product,
                    market.current_mix,
                    market.new_mix,
                    market.totals,
                );
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(market.fingerprint, key, result);
                }
                result
            }
        };

        ProductScore {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            attach: prediction.attach_pct,
            penetration: prediction.penetration_pct,
            coverage,
        }
    }
}

/// Sort a results table in place; category order ignores case
pub fn sort_scores(scores: &mut [ProductScore], column: SortColumn, direction: SortDirection) {
    scores.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            SortColumn::Attach => a.attach.total_cmp(&b.attach),
            SortColumn::Penetration => a.penetration.total_cmp(&b.penetration),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Hash of every product field the engine reads
fn product_fingerprint(product: &Product) -> u64 {
    let mut hasher = FxHasher::default();
    hash_segment_mix(&product.fit_by_segment, &mut hasher);
    product.complexity.hash(&mut hasher);
    product.current_attach_rate.map(f64::to_bits).hash(&mut hasher);
    product.backbook_multiplier.map(f64::to_bits).hash(&mut hasher);
    product.market_relevance.hash(&mut hasher);
    hasher.finish()
}

fn hash_segment_mix(mix: &SegmentMix, hasher: &mut FxHasher) {
    for value in mix.values() {
        value.to_bits().hash(hasher);
    }
}

fn hash_region_mix(mix: &RegionMix, hasher: &mut FxHasher) {
    mix.len().hash(hasher);
    for (region, segments) in mix.iter() {
        region.hash(hasher);
        hash_segment_mix(segments, hasher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryVersionStore, VersionBook};
    use crate::types::{Region, Segment};
    use approx::assert_relative_eq;

    fn scored_state() -> AppState {
        let mut state = AppState::new();
        state.products.truncate(3);
        state.products[0].category = "kitchen".into();
        state.products[0].fit_by_segment = SegmentMix::uniform(60.0);
        state.products[1].category = "Consumer".into();
        state.products[1].fit_by_segment = SegmentMix::uniform(20.0);
        state.products[2].category = "Integrations".into();
        state.products[2].fit_by_segment = SegmentMix::uniform(40.0);
        state
    }

    #[test]
    fn test_score_all_keeps_catalog_order() {
        let state = scored_state();
        let scores = CatalogScorer::default().score_all(&state).unwrap();

        let ids: Vec<&str> = scores.iter().map(|s| s.product_id.as_str()).collect();
        let expected: Vec<&str> = state.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, expected);

        // Uniform fit against any mix summing to 100
        assert_relative_eq!(scores[0].attach, 60.0, epsilon = 1e-9);
        assert_relative_eq!(scores[0].penetration, 60.0, epsilon = 1e-9);
        assert!(scores[0].coverage.is_none());
    }

    #[test]
    fn test_invalid_mix_blocks_scoring() {
        let mut state = scored_state();
        state.update_current_mix_segment(Region::Uk, Segment::Casual, 0.0);
        assert!(CatalogScorer::default().score_all(&state).is_none());
    }

    #[test]
    fn test_cache_hits_and_invalidation() {
        let mut state = scored_state();
        let scorer = CatalogScorer::default();

        let first = scorer.score_all(&state).unwrap();
        assert_eq!(scorer.cached_results(), 3);
        let second = scorer.score_all(&state).unwrap();
        assert_eq!(first, second);
        assert_eq!(scorer.cached_results(), 3);

        state.set_current_mix_with_totals(state.current_mix.clone(), [(Region::Uk, 100)].into_iter().collect());
        let weighted = scorer.score_all(&state).unwrap();
        assert_eq!(scorer.cached_results(), 3);
        assert_relative_eq!(weighted[0].coverage.unwrap().base, 100.0, epsilon = 1e-9);

        scorer.clear_cache();
        assert_eq!(scorer.cached_results(), 0);
    }

    #[test]
    fn test_cache_stays_bounded_across_mix_edits() {
        let mut state = scored_state();
        let scorer = CatalogScorer::default();

        for casual in [30.0, 31.0, 32.0, 33.0] {
            let mut mix = state.current_mix.get(Region::Uk);
            let shift = casual - mix.casual;
            mix.casual = casual;
            mix.quick_serve -= shift;
            state.current_mix.insert(Region::Uk, mix);
            scorer.score_all(&state).unwrap();
            assert_eq!(scorer.cached_results(), state.products.len());
        }
    }

    #[test]
    fn test_sort_by_category_ignores_case() {
        let state = scored_state();
        let mut scores = CatalogScorer::default().score_all(&state).unwrap();

        sort_scores(&mut scores, SortColumn::Category, SortDirection::Ascending);
        let categories: Vec<&str> = scores.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["Consumer", "Integrations", "kitchen"]);

        sort_scores(&mut scores, SortColumn::Attach, SortDirection::Descending);
        assert_relative_eq!(scores[0].attach, 60.0, epsilon = 1e-9);
        sort_scores(&mut scores, SortColumn::Penetration, SortDirection::Ascending);
        assert_relative_eq!(scores[0].penetration, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display_rounding() {
        let score = ProductScore {
            product_id: "x".into(),
            name: "X".into(),
            category: "C".into(),
            attach: 12.345,
            penetration: 0.05,
            coverage: None,
        };
        assert_relative_eq!(score.display_attach(), 12.3);
        assert_relative_eq!(score.display_penetration(), 0.1);
    }

    #[test]
    fn test_score_in_version_uses_version_or_fallback_totals() {
        let state = scored_state();
        let mut book = VersionBook::open(MemoryVersionStore::new()).unwrap();
        let id = book.save("Plan A", None, &state).unwrap();
        let version = book.get(&id).unwrap();
        let scorer = CatalogScorer::default();

        let name = state.products[2].name.clone();
        let unweighted = scorer.score_in_version(&name, version, None).unwrap();
        assert!(unweighted.coverage.is_none());

        let totals: CountryTotals = [(Region::France, 40)].into_iter().collect();
        let weighted = scorer.score_in_version(&name, version, Some(&totals)).unwrap();
        assert_relative_eq!(weighted.coverage.unwrap().base, 100.0, epsilon = 1e-9);
        assert_relative_eq!(weighted.attach, 40.0, epsilon = 1e-9);

        assert!(scorer.score_in_version("Not in catalog", version, None).is_none());
    }
}
