//! Workspace State
//!
//! Everything a user edits between calculations: both customer mixes, the
//! product catalog, imported population totals and the mix lock flags.

use serde::{Deserialize, Serialize};

use crate::defaults::{default_current_mix, default_new_mix, default_products};
use crate::store::generate_id;
use crate::types::{CountryTotals, Product, Region, RegionMix, Segment, SegmentMix};
use crate::utils::percent::validate_mix_with_tolerance;

/// Portable workspace contents (import/export and saved versions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub current_mix: RegionMix,
    pub new_mix: RegionMix,
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "CountryTotals::is_empty")]
    pub country_totals: CountryTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_mix: RegionMix,
    pub new_mix: RegionMix,
    pub products: Vec<Product>,
    /// Locations per region from the last CSV import; empty when none
    pub country_totals: CountryTotals,
    pub current_mix_locked: bool,
    pub new_mix_locked: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_mix: default_current_mix(),
            new_mix: default_new_mix(),
            products: default_products(),
            country_totals: CountryTotals::new(),
            current_mix_locked: false,
            new_mix_locked: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace from snapshot contents
    ///
    /// An empty catalog is replaced by the default one, and imported totals
    /// lock the current mix.
    pub fn restore(snapshot: AppSnapshot, current_mix_locked: bool, new_mix_locked: bool) -> Self {
        let products = if snapshot.products.is_empty() {
            default_products()
        } else {
            snapshot.products
        };
        let has_totals = !snapshot.country_totals.is_empty();

        Self {
            current_mix: snapshot.current_mix,
            new_mix: snapshot.new_mix,
            products,
            country_totals: snapshot.country_totals,
            current_mix_locked: has_totals || current_mix_locked,
            new_mix_locked,
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            current_mix: self.current_mix.clone(),
            new_mix: self.new_mix.clone(),
            products: self.products.clone(),
            country_totals: self.country_totals.clone(),
        }
    }

    /// Replace mixes and catalog; totals only when the snapshot carries them
    pub fn import_snapshot(&mut self, snapshot: AppSnapshot) {
        self.current_mix = snapshot.current_mix;
        self.new_mix = snapshot.new_mix;
        self.products = snapshot.products;
        if !snapshot.country_totals.is_empty() {
            self.country_totals = snapshot.country_totals;
            self.current_mix_locked = true;
        }
    }

    /// Totals for the engine, `None` when nothing has been imported
    pub fn country_totals_opt(&self) -> Option<&CountryTotals> {
        if self.country_totals.is_empty() {
            None
        } else {
            Some(&self.country_totals)
        }
    }

    /// Every region of both mixes sums to 100 within `tolerance`
    pub fn can_calculate(&self, tolerance: f64) -> bool {
        let valid = |mix: &RegionMix| {
            Region::ALL
                .iter()
                .all(|&region| validate_mix_with_tolerance(&mix.get(region), tolerance).is_valid)
        };
        valid(&self.current_mix) && valid(&self.new_mix)
    }

    // ========================================================================
    // Mixes
    // ========================================================================

    pub fn set_current_mix(&mut self, mix: RegionMix) {
        self.current_mix = mix;
    }

    pub fn set_new_mix(&mut self, mix: RegionMix) {
        self.new_mix = mix;
    }

    /// Install an imported mix with its population totals and lock it
    pub fn set_current_mix_with_totals(&mut self, mix: RegionMix, totals: CountryTotals) {
        self.current_mix = mix;
        self.country_totals = totals;
        self.current_mix_locked = true;
    }

    pub fn update_current_mix_segment(&mut self, region: Region, segment: Segment, value: f64) {
        self.current_mix.get_mut(region).set(segment, value);
    }

    pub fn update_new_mix_segment(&mut self, region: Region, segment: Segment, value: f64) {
        self.new_mix.get_mut(region).set(segment, value);
    }

    /// Imported totals keep the current mix locked
    pub fn toggle_current_mix_lock(&mut self) {
        self.current_mix_locked = if self.country_totals.is_empty() {
            !self.current_mix_locked
        } else {
            true
        };
    }

    pub fn toggle_new_mix_lock(&mut self) {
        self.new_mix_locked = !self.new_mix_locked;
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Append a product under a fresh id and return the id
    pub fn add_product(&mut self, mut product: Product) -> String {
        product.id = generate_id();
        let id = product.id.clone();
        self.products.push(product);
        id
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Edit a product in place; the id cannot change
    pub fn update_product<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut Product),
    {
        let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        let original_id = product.id.clone();
        edit(product);
        product.id = original_id;
        true
    }

    pub fn delete_product(&mut self, id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    /// Append a copy under a fresh id
    pub fn duplicate_product(&mut self, id: &str) -> Option<String> {
        let copy = self.product(id)?.clone();
        Some(self.add_product(copy))
    }

    /// Move `active_id` to the position currently held by `over_id`
    pub fn reorder_products(&mut self, active_id: &str, over_id: &str) {
        let active = self.products.iter().position(|p| p.id == active_id);
        let over = self.products.iter().position(|p| p.id == over_id);

        if let (Some(from), Some(to)) = (active, over) {
            if from != to {
                let moved = self.products.remove(from);
                self.products.insert(to, moved);
            }
        }
    }

    /// Default mixes, every fit zeroed; other product fields are kept
    pub fn reset_to_defaults(&mut self) {
        self.current_mix = default_current_mix();
        self.new_mix = default_new_mix();
        for product in &mut self.products {
            product.fit_by_segment = SegmentMix::zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComplexityLevel;

    fn ids(state: &AppState) -> Vec<String> {
        state.products.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_fresh_state_can_calculate() {
        let state = AppState::new();
        assert_eq!(state.products.len(), 13);
        assert!(state.can_calculate(0.1));
        assert!(state.country_totals_opt().is_none());
    }

    #[test]
    fn test_invalid_region_blocks_calculation() {
        let mut state = AppState::new();
        state.update_new_mix_segment(Region::Malta, Segment::Bar, 8.0);
        assert!(!state.can_calculate(0.1));

        state.update_new_mix_segment(Region::Malta, Segment::Bar, 7.05);
        assert!(state.can_calculate(0.1));
    }

    #[test]
    fn test_totals_lock_current_mix() {
        let mut state = AppState::new();
        let totals: CountryTotals = [(Region::Uk, 100)].into_iter().collect();
        state.set_current_mix_with_totals(default_current_mix(), totals);
        assert!(state.current_mix_locked);

        state.toggle_current_mix_lock();
        assert!(state.current_mix_locked);
        assert!(state.country_totals_opt().is_some());
    }

    #[test]
    fn test_locks_toggle_without_totals() {
        let mut state = AppState::new();
        state.toggle_current_mix_lock();
        assert!(state.current_mix_locked);
        state.toggle_current_mix_lock();
        assert!(!state.current_mix_locked);

        state.toggle_new_mix_lock();
        assert!(state.new_mix_locked);
    }

    #[test]
    fn test_add_duplicate_delete() {
        let mut state = AppState::new();
        let id = state.add_product(Product::new("ignored", "Kitchen", "Waste Tracking"));
        assert_ne!(id, "ignored");
        assert_eq!(state.products.len(), 14);

        let copy = state.duplicate_product(&id).unwrap();
        assert_ne!(copy, id);
        assert_eq!(state.product(&copy).unwrap().name, "Waste Tracking");

        assert!(state.delete_product(&id));
        assert!(!state.delete_product(&id));
        assert!(state.duplicate_product("missing").is_none());
    }

    #[test]
    fn test_update_product_keeps_id() {
        let mut state = AppState::new();
        let id = state.products[0].id.clone();

        let found = state.update_product(&id, |p| {
            p.id = "hijack".to_string();
            p.complexity = Some(ComplexityLevel::Low);
        });
        assert!(found);
        assert_eq!(state.products[0].id, id);
        assert_eq!(state.products[0].complexity, Some(ComplexityLevel::Low));
        assert!(!state.update_product("missing", |_| {}));
    }

    #[test]
    fn test_reorder_moves_to_target_index() {
        let mut state = AppState::new();
        state.products.truncate(4);
        let before = ids(&state);

        state.reorder_products(&before[0], &before[2]);
        assert_eq!(ids(&state), vec![before[1].clone(), before[2].clone(), before[0].clone(), before[3].clone()]);

        state.reorder_products(&before[3], &before[1]);
        assert_eq!(ids(&state), vec![before[3].clone(), before[1].clone(), before[2].clone(), before[0].clone()]);

        let unchanged = ids(&state);
        state.reorder_products("missing", &before[1]);
        state.reorder_products(&before[1], &before[1]);
        assert_eq!(ids(&state), unchanged);
    }

    #[test]
    fn test_reset_zeroes_fit_and_keeps_metadata() {
        let mut state = AppState::new();
        state.products[0].fit_by_segment = SegmentMix::uniform(40.0);
        state.products[0].current_attach_rate = Some(12.0);
        state.products[0].notes = Some("pilot".into());
        state.update_current_mix_segment(Region::Uk, Segment::Bar, 99.0);

        state.reset_to_defaults();
        assert_eq!(state.products[0].fit_by_segment, SegmentMix::zero());
        assert_eq!(state.products[0].current_attach_rate, Some(12.0));
        assert_eq!(state.products[0].notes.as_deref(), Some("pilot"));
        assert_eq!(state.current_mix, default_current_mix());
    }

    #[test]
    fn test_restore_fills_empty_catalog_and_locks_with_totals() {
        let snapshot = AppSnapshot {
            current_mix: default_current_mix(),
            new_mix: default_new_mix(),
            products: Vec::new(),
            country_totals: [(Region::France, 5)].into_iter().collect(),
        };
        let state = AppState::restore(snapshot, false, true);

        assert_eq!(state.products.len(), 13);
        assert!(state.current_mix_locked);
        assert!(state.new_mix_locked);
    }

    #[test]
    fn test_snapshot_import_round_trip() {
        let mut state = AppState::new();
        state.products.truncate(2);
        let snapshot = state.snapshot();

        let mut other = AppState::new();
        other.import_snapshot(snapshot.clone());
        assert_eq!(other.products, snapshot.products);
        assert!(!other.current_mix_locked);
    }
}
