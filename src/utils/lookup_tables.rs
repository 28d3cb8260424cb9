//! Static Lookup Tables
//!
//! Display labels and ISO codes for the fixed key sets, plus the two mapping
//! tables used when ingesting location-count CSV exports:
//! - country display name -> region
//! - cohort code -> segment

use crate::types::{Region, Segment};

// ============================================================================
// KEY SET LABELS
// Indexed by the enum declaration order
// ============================================================================

pub(crate) static SEGMENT_LABELS: [&str; 5] = [
    "Casual",
    "Upscale Casual",
    "Fine Dining",
    "Bar",
    "Quick Serve",
];

pub(crate) static REGION_LABELS: [&str; 10] = [
    "Belgium",
    "Canada",
    "Switzerland",
    "Germany",
    "France",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "UK",
    "US",
];

pub(crate) static REGION_CODES: [&str; 10] = [
    "BE", "CA", "CH", "DE", "FR", "LU", "MT", "NL", "GB", "US",
];

// ============================================================================
// CSV MAPPING TABLES
// ============================================================================

static CSV_COUNTRIES: &[(&str, Region)] = &[
    ("Belgium", Region::Belgium),
    ("Canada", Region::Canada),
    ("Switzerland", Region::Switzerland),
    ("Germany", Region::Germany),
    ("France", Region::France),
    ("Luxembourg", Region::Luxembourg),
    ("Malta", Region::Malta),
    ("Netherlands", Region::Netherlands),
    ("United Kingdom", Region::Uk),
    ("United States", Region::Us),
];

static CSV_COHORTS: &[(&str, Segment)] = &[
    ("bar", Segment::Bar),
    ("fast_casual", Segment::QuickServe),
    ("casual", Segment::Casual),
    ("upscale", Segment::UpscaleCasual),
    ("fine_dining", Segment::FineDining),
];

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

/// Region for a CSV country display name (exact match after trimming)
pub fn region_for_country(name: &str) -> Option<Region> {
    let name = name.trim();
    CSV_COUNTRIES
        .iter()
        .find(|(country, _)| *country == name)
        .map(|(_, region)| *region)
}

/// Segment for a CSV cohort code (case-insensitive)
pub fn segment_for_cohort(cohort: &str) -> Option<Segment> {
    let cohort = cohort.trim().to_lowercase();
    CSV_COHORTS
        .iter()
        .find(|(code, _)| *code == cohort)
        .map(|(_, segment)| *segment)
}

/// Region for an ISO country code
pub fn region_for_code(code: &str) -> Option<Region> {
    Region::ALL.into_iter().find(|r| r.code() == code)
}
