//! Utility modules for fit scoring
//!
//! Contains shared functionality used across the engine:
//! - Percent: clamping, display rounding, mix validation and normalization
//! - Lookup tables: labels, ISO codes and CSV name mappings

pub mod lookup_tables;
pub mod percent;

// Re-export commonly used helpers
pub use lookup_tables::{region_for_code, region_for_country, segment_for_cohort};
pub use percent::{
    clamp_percent, normalize_segment_mix, round_to_one_decimal, validate_mix,
    validate_mix_with_tolerance, MixValidation, MIX_TOLERANCE,
};
