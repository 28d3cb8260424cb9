//! Product Fit Scorer
//!
//! Predicts how a product will land with restaurant customers across markets:
//! attach rate among net-new customers and penetration into the existing base.
//!
//! Module layout:
//! - `utils/`: percentage helpers and lookup tables
//! - `engine/`: mix aggregation, weighted fit, country rows, attach/penetration
//! - `data`: location-count CSV ingestion, one line at a time
//! - `scorer`: parallel catalog scoring (Rayon)
//! - `store/`: workspace state, snapshot migration, saved versions
//!
//! Inputs are percentages in 0-100 throughout; outputs are clamped to that range.

pub mod config;
pub mod data;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod scorer;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{ComplexityFactors, EngineConfig};
pub use data::{load_location_csv, parse_location_csv, MarketData};
pub use engine::{compute_attach, compute_penetration, compute_weighted_fit, predict_product, Coverage, Prediction};
pub use error::{IngestError, StoreError};
pub use scorer::{sort_scores, CatalogScorer, ProductScore, SortColumn, SortDirection};
pub use store::{AppSnapshot, AppState, SavedVersion, VersionBook};
pub use types::{ComplexityLevel, CountryTotals, Product, Region, RegionMix, Segment, SegmentMix};
pub use utils::{clamp_percent, normalize_segment_mix, round_to_one_decimal, validate_mix};
