//! Core Data Model
//!
//! Segment and region key sets, segment mixes, population totals and the
//! product record scored by the engine.
//!
//! Serialized field names follow the stored snapshot format (camelCase keys,
//! lowercase region keys) so saved versions stay readable across releases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::lookup_tables::{REGION_CODES, REGION_LABELS, SEGMENT_LABELS};

/// Restaurant type segment
///
/// Declaration order is the fixed segment order used for iteration and
/// tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Segment {
    Casual,
    UpscaleCasual,
    FineDining,
    Bar,
    QuickServe,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Casual,
        Segment::UpscaleCasual,
        Segment::FineDining,
        Segment::Bar,
        Segment::QuickServe,
    ];

    /// Position in the fixed segment order
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display label ("Upscale Casual")
    pub fn label(self) -> &'static str {
        SEGMENT_LABELS[self.index()]
    }
}

/// Country the customer base is segmented by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Belgium,
    Canada,
    Switzerland,
    Germany,
    France,
    Luxembourg,
    Malta,
    Netherlands,
    Uk,
    Us,
}

impl Region {
    pub const ALL: [Region; 10] = [
        Region::Belgium,
        Region::Canada,
        Region::Switzerland,
        Region::Germany,
        Region::France,
        Region::Luxembourg,
        Region::Malta,
        Region::Netherlands,
        Region::Uk,
        Region::Us,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// ISO country code ("GB" for the UK)
    pub fn code(self) -> &'static str {
        REGION_CODES[self.index()]
    }

    pub fn label(self) -> &'static str {
        REGION_LABELS[self.index()]
    }
}

/// Percentage per segment (0-100 each)
///
/// Used both for customer mixes (conceptually summing to 100) and for product
/// fit vectors (independent per-segment adoption fractions).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentMix {
    pub casual: f64,
    pub upscale_casual: f64,
    pub fine_dining: f64,
    pub bar: f64,
    pub quick_serve: f64,
}

impl SegmentMix {
    pub const fn new(casual: f64, upscale_casual: f64, fine_dining: f64, bar: f64, quick_serve: f64) -> Self {
        Self { casual, upscale_casual, fine_dining, bar, quick_serve }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Same value in every segment
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value, value)
    }

    pub fn get(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Casual => self.casual,
            Segment::UpscaleCasual => self.upscale_casual,
            Segment::FineDining => self.fine_dining,
            Segment::Bar => self.bar,
            Segment::QuickServe => self.quick_serve,
        }
    }

    pub fn get_mut(&mut self, segment: Segment) -> &mut f64 {
        match segment {
            Segment::Casual => &mut self.casual,
            Segment::UpscaleCasual => &mut self.upscale_casual,
            Segment::FineDining => &mut self.fine_dining,
            Segment::Bar => &mut self.bar,
            Segment::QuickServe => &mut self.quick_serve,
        }
    }

    pub fn set(&mut self, segment: Segment, value: f64) {
        *self.get_mut(segment) = value;
    }

    /// Values in fixed segment order
    pub fn values(&self) -> [f64; 5] {
        [self.casual, self.upscale_casual, self.fine_dining, self.bar, self.quick_serve]
    }

    pub fn total(&self) -> f64 {
        self.values().iter().sum()
    }
}

/// Segment mix per region
///
/// Regions absent from the map are treated as all-zero mixes by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionMix(BTreeMap<Region, SegmentMix>);

impl RegionMix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every region set to the same mix
    pub fn uniform(mix: SegmentMix) -> Self {
        Region::ALL.iter().map(|&r| (r, mix)).collect()
    }

    /// Mix for a region, all-zero when missing
    pub fn get(&self, region: Region) -> SegmentMix {
        self.0.get(&region).copied().unwrap_or_default()
    }

    pub fn get_entry(&self, region: Region) -> Option<&SegmentMix> {
        self.0.get(&region)
    }

    pub fn get_mut(&mut self, region: Region) -> &mut SegmentMix {
        self.0.entry(region).or_default()
    }

    pub fn insert(&mut self, region: Region, mix: SegmentMix) {
        self.0.insert(region, mix);
    }

    pub fn contains(&self, region: Region) -> bool {
        self.0.contains_key(&region)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, &SegmentMix)> {
        self.0.iter().map(|(r, m)| (*r, m))
    }

    pub fn values(&self) -> impl Iterator<Item = &SegmentMix> {
        self.0.values()
    }
}

impl FromIterator<(Region, SegmentMix)> for RegionMix {
    fn from_iter<I: IntoIterator<Item = (Region, SegmentMix)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Location count per region
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct CountryTotals(BTreeMap<Region, u64>);

impl CountryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locations for a region, 0 when missing
    pub fn get(&self, region: Region) -> u64 {
        self.0.get(&region).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, region: Region, locations: u64) {
        self.0.insert(region, locations);
    }

    /// Sum over all regions
    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, u64)> + '_ {
        self.0.iter().map(|(r, v)| (*r, *v))
    }
}

impl FromIterator<(Region, u64)> for CountryTotals {
    fn from_iter<I: IntoIterator<Item = (Region, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Implementation complexity, drives penetration friction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    Mandatory,
}

/// Known competitors per market (informational only)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompetitorsByRegion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uk: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germany: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub france: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belgium: Option<Vec<String>>,
}

/// A catalog item being scored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Expected adoption % per segment; does not need to sum to 100
    #[serde(default)]
    pub fit_by_segment: SegmentMix,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_who_want_it: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_who_can_use_it: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityLevel>,

    /// Observed attach % (0-100); overrides fit when > 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_attach_rate: Option<f64>,

    /// Friction on the existing base (0-1), 1.0 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backbook_multiplier: Option<f64>,

    /// Regions the product applies to; empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub market_relevance: Vec<Region>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<CompetitorsByRegion>,
}

impl Product {
    pub fn new(id: impl Into<String>, category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_fit(mut self, fit: SegmentMix) -> Self {
        self.fit_by_segment = fit;
        self
    }

    /// Anchor rate when set and positive
    pub fn attach_anchor(&self) -> Option<f64> {
        self.current_attach_rate.filter(|rate| *rate > 0.0)
    }
}
