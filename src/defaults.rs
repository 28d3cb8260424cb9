//! Default Mixes and Catalog
//!
//! Starting state for a fresh workspace: observed customer mixes per region
//! and the product catalog with empty fit vectors.

use crate::store::generate_id;
use crate::types::{Product, Region, RegionMix, SegmentMix};

// ============================================================================
// CUSTOMER MIXES
// ============================================================================

/// Observed existing-customer mix (casual, upscale casual, fine dining, bar, quick serve)
const CURRENT_MIX_TABLE: [(Region, SegmentMix); 10] = [
    (Region::Belgium, SegmentMix::new(41.0, 19.0, 1.0, 16.0, 23.0)),
    (Region::Canada, SegmentMix::new(45.0, 4.0, 2.0, 11.0, 38.0)),
    (Region::Switzerland, SegmentMix::new(44.0, 3.0, 4.0, 12.0, 37.0)),
    (Region::Germany, SegmentMix::new(52.0, 10.0, 1.0, 8.0, 29.0)),
    (Region::France, SegmentMix::new(48.0, 11.0, 4.0, 15.0, 22.0)),
    (Region::Luxembourg, SegmentMix::new(45.0, 14.0, 4.0, 7.0, 30.0)),
    (Region::Malta, SegmentMix::new(48.0, 6.0, 1.0, 7.0, 38.0)),
    (Region::Netherlands, SegmentMix::new(54.0, 6.0, 1.0, 5.0, 34.0)),
    (Region::Uk, SegmentMix::new(40.0, 9.0, 1.0, 15.0, 35.0)),
    (Region::Us, SegmentMix::new(37.0, 6.0, 0.0, 18.0, 39.0)),
];

/// Mix written by early releases for every segment of the current cohort
pub(crate) const LEGACY_CURRENT_MIX: SegmentMix = SegmentMix::uniform(20.0);

/// Mix written by early releases for the net-new cohort
pub(crate) const LEGACY_NEW_MIX: SegmentMix = SegmentMix::new(15.0, 15.0, 10.0, 10.0, 50.0);

/// Default mix for one region's existing customers
pub fn default_current_segment_mix(region: Region) -> SegmentMix {
    CURRENT_MIX_TABLE[region.index()].1
}

pub fn default_current_mix() -> RegionMix {
    CURRENT_MIX_TABLE.iter().copied().collect()
}

/// Net-new customers start out looking like the existing base
pub fn default_new_mix() -> RegionMix {
    default_current_mix()
}

// ============================================================================
// PRODUCT CATALOG
// ============================================================================

const CATALOG: [(&str, &str); 13] = [
    ("Online Ordering", "Order on my website"),
    ("Online Ordering", "Order via 3rd party integration"),
    ("In-Person Ordering", "Point-of-sale (stationary or mobile)"),
    ("In-Person Ordering", "Digital on-table ordering & payments"),
    ("In-Person Ordering", "Ordering kiosk"),
    ("Integrations", "Omniboost PMS Integration"),
    ("Integrations", "Direct API Access"),
    ("Integrations", "Accounting"),
    ("Consumer", "Loyalty"),
    ("Consumer", "Physical Gift Cards"),
    ("Consumer", "Digital Gift Cards"),
    ("Kitchen", "Inventory Management"),
    ("Kitchen", "KDS"),
];

/// Catalog with all-zero fit vectors and fresh ids
pub fn default_products() -> Vec<Product> {
    CATALOG
        .iter()
        .map(|&(category, name)| Product::new(generate_id(), category, name))
        .collect()
}
