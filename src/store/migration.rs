//! Snapshot Migration
//!
//! Stored workspaces come in three historical layouts, recognised by the
//! shape of `currentMix`:
//!   1. Region-keyed mixes over the ten current regions
//!   2. Legacy region keys: `uk`, `germany`, `france`, `benelux`, `row`
//!   3. One flat segment mix shared by every region
//!
//! Each layout is its own variant. The layout is picked from the keys of
//! `currentMix`: `casual` without `uk` is a single mix, `uk` without
//! `belgium` is the legacy region set, and any current region key is the
//! current layout. Keys outside the chosen layout are ignored. Products go
//! through `StoredProduct`, which also accepts retired field names.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::defaults::{
    default_current_mix, default_current_segment_mix, default_new_mix, LEGACY_CURRENT_MIX, LEGACY_NEW_MIX,
};
use crate::store::generate_id;
use crate::store::state::{AppSnapshot, AppState};
use crate::types::{CompetitorsByRegion, ComplexityLevel, CountryTotals, Product, Region, RegionMix, SegmentMix};

/// A workspace as found on disk
#[derive(Debug, Clone)]
pub enum StoredSnapshot {
    Current(CurrentLayout),
    LegacyRegions(LegacyRegionsLayout),
    SingleMix(SingleMixLayout),
}

#[derive(Debug, Clone)]
pub struct CurrentLayout {
    current_mix: BTreeMap<Region, SegmentMix>,
    new_mix: Option<BTreeMap<Region, SegmentMix>>,
    common: CommonFields,
}

#[derive(Debug, Clone)]
pub struct LegacyRegionsLayout {
    current_mix: LegacyRegionMix,
    new_mix: Option<LegacyRegionMix>,
    common: CommonFields,
}

#[derive(Debug, Clone)]
pub struct SingleMixLayout {
    current_mix: SegmentMix,
    new_mix: Option<SegmentMix>,
    common: CommonFields,
}

/// Snapshot with the mixes still untyped, before the layout is known
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    current_mix: Map<String, Value>,
    #[serde(default)]
    new_mix: Option<Map<String, Value>>,
    #[serde(flatten)]
    common: CommonFields,
}

impl RawSnapshot {
    fn classify(self) -> Result<StoredSnapshot, serde_json::Error> {
        let RawSnapshot {
            current_mix,
            new_mix,
            common,
        } = self;
        let has = |key: &str| current_mix.contains_key(key);

        if has("casual") && !has("uk") {
            return Ok(StoredSnapshot::SingleMix(SingleMixLayout {
                current_mix: from_object::<SegmentMix>(current_mix)?,
                new_mix: new_mix.map(from_object::<SegmentMix>).transpose()?,
                common,
            }));
        }

        if has("uk") && !has("belgium") {
            return Ok(StoredSnapshot::LegacyRegions(LegacyRegionsLayout {
                current_mix: from_object::<LegacyRegionMix>(current_mix)?,
                new_mix: new_mix.map(from_object::<LegacyRegionMix>).transpose()?,
                common,
            }));
        }

        if current_mix.keys().any(|key| region_key(key).is_some()) {
            return Ok(StoredSnapshot::Current(CurrentLayout {
                current_mix: region_entries(current_mix)?,
                new_mix: new_mix.map(region_entries).transpose()?,
                common,
            }));
        }

        Err(serde_json::Error::custom("currentMix matches no known layout"))
    }
}

impl<'de> Deserialize<'de> for StoredSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawSnapshot::deserialize(deserializer)?
            .classify()
            .map_err(D::Error::custom)
    }
}

fn from_object<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(map))
}

fn region_key(key: &str) -> Option<Region> {
    serde_json::from_value(Value::String(key.to_string())).ok()
}

/// Typed mixes for the recognised regions; other keys are dropped
fn region_entries(map: Map<String, Value>) -> Result<BTreeMap<Region, SegmentMix>, serde_json::Error> {
    let mut mixes = BTreeMap::new();
    for (key, value) in map {
        match region_key(&key) {
            Some(region) => {
                mixes.insert(region, serde_json::from_value(value)?);
            }
            None => tracing::debug!("Ignoring unknown region '{}' in stored mix", key),
        }
    }
    Ok(mixes)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommonFields {
    #[serde(default)]
    products: Option<Vec<StoredProduct>>,
    #[serde(default)]
    country_totals: Option<CountryTotals>,
    #[serde(default)]
    current_mix_locked: Option<bool>,
    #[serde(default)]
    new_mix_locked: Option<bool>,
}

/// Mix keyed by the retired region set
#[derive(Debug, Clone, Deserialize)]
struct LegacyRegionMix {
    uk: SegmentMix,
    #[serde(default)]
    germany: Option<SegmentMix>,
    #[serde(default)]
    france: Option<SegmentMix>,
    #[serde(default)]
    benelux: Option<SegmentMix>,
    #[serde(default)]
    row: Option<SegmentMix>,
}

impl LegacyRegionMix {
    /// Map onto the current regions; unmapped regions take the default mix
    fn to_region_mix(&self) -> RegionMix {
        Region::ALL
            .iter()
            .map(|&region| {
                let source = match region {
                    Region::Belgium | Region::Luxembourg | Region::Netherlands => self.benelux,
                    Region::Us | Region::Canada => self.row,
                    Region::Uk => Some(self.uk),
                    Region::Germany => self.germany,
                    Region::France => self.france,
                    Region::Switzerland | Region::Malta => None,
                };
                (region, source.unwrap_or_else(|| default_current_segment_mix(region)))
            })
            .collect()
    }
}

/// A stored product, tolerant of missing fields and retired names
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProduct {
    id: Option<String>,
    category: Option<String>,
    name: Option<String>,
    notes: Option<String>,
    fit_by_segment: Option<SegmentMix>,
    percent_who_want_it: Option<f64>,
    percent_who_will_pay: Option<f64>,
    percent_who_can_use_it: Option<f64>,
    percent_who_will_use: Option<f64>,
    complexity: Option<ComplexityLevel>,
    current_attach_rate: Option<f64>,
    backbook_multiplier: Option<f64>,
    market_relevance: Option<Vec<Region>>,
    competitors: Option<CompetitorsByRegion>,
}

impl StoredProduct {
    pub fn into_product(self) -> Product {
        Product {
            id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(generate_id),
            category: self.category.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            notes: self.notes,
            fit_by_segment: self.fit_by_segment.unwrap_or_default(),
            percent_who_want_it: self.percent_who_want_it.or(self.percent_who_will_pay),
            percent_who_can_use_it: self.percent_who_can_use_it.or(self.percent_who_will_use),
            complexity: self.complexity,
            current_attach_rate: self.current_attach_rate,
            backbook_multiplier: self.backbook_multiplier,
            market_relevance: self.market_relevance.unwrap_or_default(),
            competitors: self.competitors,
        }
    }
}

/// Layout-independent result of reading a stored snapshot
#[derive(Debug, Clone)]
pub struct Migrated {
    pub snapshot: AppSnapshot,
    pub current_mix_locked: bool,
    pub new_mix_locked: bool,
}

impl StoredSnapshot {
    pub fn layout_name(&self) -> &'static str {
        match self {
            StoredSnapshot::Current(_) => "current",
            StoredSnapshot::LegacyRegions(_) => "legacy-regions",
            StoredSnapshot::SingleMix(_) => "single-mix",
        }
    }

    pub fn migrate(self) -> Migrated {
        let layout = self.layout_name();
        let legacy = !matches!(self, StoredSnapshot::Current(_));
        let (current_mix, new_mix, common) = match self {
            StoredSnapshot::Current(stored) => {
                let current_mix = fill_missing_regions(stored.current_mix);
                let new_mix = stored.new_mix.map(fill_missing_regions).unwrap_or_else(default_new_mix);
                let totals_present = stored.common.country_totals.as_ref().is_some_and(|t| !t.is_empty());
                let (current_mix, new_mix) = if totals_present {
                    (current_mix, new_mix)
                } else {
                    upgrade_stale_defaults(current_mix, new_mix)
                };
                (current_mix, new_mix, stored.common)
            }
            StoredSnapshot::LegacyRegions(stored) => {
                let current_mix = stored.current_mix.to_region_mix();
                let new_mix = stored
                    .new_mix
                    .map(|mix| mix.to_region_mix())
                    .unwrap_or_else(default_new_mix);
                (current_mix, new_mix, stored.common)
            }
            StoredSnapshot::SingleMix(stored) => {
                let current_mix = RegionMix::uniform(stored.current_mix);
                let new_mix = stored.new_mix.map(RegionMix::uniform).unwrap_or_else(default_new_mix);
                (current_mix, new_mix, stored.common)
            }
        };

        if legacy {
            tracing::info!("Migrated stored workspace from {} layout", layout);
        }

        let products = common
            .products
            .unwrap_or_default()
            .into_iter()
            .map(StoredProduct::into_product)
            .collect();

        Migrated {
            snapshot: AppSnapshot {
                current_mix,
                new_mix,
                products,
                country_totals: common.country_totals.unwrap_or_default(),
            },
            current_mix_locked: common.current_mix_locked.unwrap_or(false),
            new_mix_locked: common.new_mix_locked.unwrap_or(false),
        }
    }

    pub fn into_state(self) -> AppState {
        let migrated = self.migrate();
        AppState::restore(migrated.snapshot, migrated.current_mix_locked, migrated.new_mix_locked)
    }
}

impl AppState {
    /// Read a persisted workspace in any historical layout
    pub fn from_json(json: &str) -> Result<AppState, serde_json::Error> {
        let stored: StoredSnapshot = serde_json::from_str(json)?;
        Ok(stored.into_state())
    }
}

/// Deserialize any stored layout straight into the current snapshot shape
pub fn deserialize_snapshot<'de, D>(deserializer: D) -> Result<AppSnapshot, D::Error>
where
    D: Deserializer<'de>,
{
    StoredSnapshot::deserialize(deserializer).map(|stored| stored.migrate().snapshot)
}

fn fill_missing_regions(stored: BTreeMap<Region, SegmentMix>) -> RegionMix {
    Region::ALL
        .iter()
        .map(|&region| {
            let mix = stored
                .get(&region)
                .copied()
                .unwrap_or_else(|| default_current_segment_mix(region));
            (region, mix)
        })
        .collect()
}

/// Replace the placeholder mixes early releases wrote for every region
///
/// Only meaningful without imported totals; an imported mix is never touched.
pub fn upgrade_stale_defaults(current_mix: RegionMix, new_mix: RegionMix) -> (RegionMix, RegionMix) {
    let every_region_is = |mix: &RegionMix, stale: SegmentMix| {
        Region::ALL
            .iter()
            .all(|&region| mix.get_entry(region) == Some(&stale))
    };

    let current_mix = if every_region_is(&current_mix, LEGACY_CURRENT_MIX) {
        tracing::info!("Replacing placeholder current mix with observed defaults");
        default_current_mix()
    } else {
        current_mix
    };

    let new_mix = if every_region_is(&new_mix, LEGACY_NEW_MIX) {
        tracing::info!("Replacing placeholder new mix with observed defaults");
        default_new_mix()
    } else {
        new_mix
    };

    (current_mix, new_mix)
}
