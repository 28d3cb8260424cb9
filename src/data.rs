//! Location CSV Ingestion
//!
//! Converts an exported location-count CSV into a normalized region mix and
//! per-region population totals.
//!
//! Expected columns (header row skipped, matched by position):
//!   1. Country      - display name, only on the first row of each block
//!   2. Cohort       - `bar`, `fast_casual`, `casual`, `upscale`, `fine_dining`
//!   3. Locations    - integer, may be quoted with thousands separators
//!   4. Percentage   - share of the country's locations, `%` optional
//!
//! Unrecognised countries and cohorts, short or malformed lines and
//! unparseable numbers are skipped; only an empty or header-only file is an
//! error.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::IngestError;
use crate::types::{CountryTotals, Region, RegionMix, Segment, SegmentMix};
use crate::utils::lookup_tables::{region_for_country, segment_for_cohort};
use crate::utils::percent::{normalize_segment_mix, round_half_up};

const MIN_FIELDS: usize = 4;

/// One accepted CSV data row
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub region: Region,
    pub segment: Segment,
    pub total_locations: i64,
    pub percentage: f64,
}

/// Normalized market data for the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub region_mix: RegionMix,
    pub country_totals: CountryTotals,
    pub total_locations: u64,
    /// % of the total base each region represents
    pub country_percentages: BTreeMap<Region, f64>,
}

/// Load and normalize a location CSV from disk
pub fn load_location_csv(path: &Path) -> Result<MarketData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read location CSV: {:?}", path))?;

    let market = parse_location_csv(&text)
        .with_context(|| format!("Failed to ingest location CSV: {:?}", path))?;

    tracing::info!(
        "Loaded {:?}: {} locations across {} regions",
        path,
        market.total_locations,
        market.country_totals.iter().filter(|(_, n)| *n > 0).count()
    );

    Ok(market)
}

/// Parse and normalize location CSV text
pub fn parse_location_csv(text: &str) -> Result<MarketData, IngestError> {
    let rows = read_location_rows(text)?;
    Ok(normalize_location_rows(&rows))
}

/// Parse CSV text into accepted rows
///
/// Lines are tokenised one at a time, so a malformed line only loses itself.
/// The country column carries forward: rows with a blank or unrecognised
/// country belong to the last recognised one.
pub fn read_location_rows(text: &str) -> Result<Vec<LocationRow>, IngestError> {
    let lines: Vec<&str> = text.trim().split('\n').collect();
    if lines.len() < 2 {
        return Err(IngestError::TooShort);
    }

    let mut rows = Vec::with_capacity(lines.len() - 1);
    let mut current_region: Option<Region> = None;
    let mut skipped = 0usize;

    // Line 0 is the header
    for line in &lines[1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        let [country, cohort, locations, percentage, ..] = fields.as_slice() else {
            skipped += 1;
            continue;
        };

        if let Some(region) = region_for_country(country) {
            current_region = Some(region);
        }

        let parsed = current_region.and_then(|region| {
            Some(LocationRow {
                region,
                segment: segment_for_cohort(cohort)?,
                total_locations: parse_location_count(locations)?,
                percentage: parse_percentage(percentage)?,
            })
        });

        match parsed {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    tracing::debug!("Location CSV: {} rows accepted, {} skipped", rows.len(), skipped);
    Ok(rows)
}

/// Split one line on commas outside double quotes
///
/// Quote characters toggle quoting and are dropped; every field is trimmed.
/// An unbalanced quote swallows the rest of the line into one field.
fn split_fields(line: &str) -> SmallVec<[String; MIN_FIELDS]> {
    let mut fields = SmallVec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Group accepted rows into a normalized mix and population totals
///
/// Per region the segment percentage is the rounded CSV value of the last row
/// seen for that segment; location counts accumulate across rows. Each region
/// mix is then normalized to sum to 100.
pub fn normalize_location_rows(rows: &[LocationRow]) -> MarketData {
    let mut mixes: FxHashMap<Region, SegmentMix> = FxHashMap::default();
    let mut locations: FxHashMap<Region, i64> = FxHashMap::default();

    for row in rows {
        mixes
            .entry(row.region)
            .or_default()
            .set(row.segment, round_half_up(row.percentage));
        let total = locations.entry(row.region).or_insert(0);
        *total = total.saturating_add(row.total_locations);
    }

    let region_mix: RegionMix = Region::ALL
        .iter()
        .map(|&region| {
            let raw = mixes.get(&region).copied().unwrap_or_default();
            (region, normalize_segment_mix(&raw))
        })
        .collect();

    let country_totals: CountryTotals = Region::ALL
        .iter()
        .map(|&region| {
            let count = locations.get(&region).copied().unwrap_or(0);
            (region, u64::try_from(count).unwrap_or(0))
        })
        .collect();

    let total_locations = country_totals.total();
    let country_percentages = Region::ALL
        .iter()
        .map(|&region| {
            let share = if total_locations > 0 {
                country_totals.get(region) as f64 / total_locations as f64 * 100.0
            } else {
                0.0
            };
            (region, share)
        })
        .collect();

    MarketData {
        region_mix,
        country_totals,
        total_locations,
        country_percentages,
    }
}

/// Integer location count; quotes, apostrophes and thousands separators are
/// ignored and trailing garbage after the digits is dropped ("12.7" -> 12)
fn parse_location_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '"' | '\'' | ',')).collect();
    let cleaned = cleaned.trim_start();

    let sign_len = usize::from(cleaned.starts_with(['-', '+']));
    let digits_len = cleaned[sign_len..].chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    cleaned[..sign_len + digits_len].parse().ok()
}

/// Leading decimal number after removing the first `%` ("15.5%" -> 15.5)
fn parse_percentage(raw: &str) -> Option<f64> {
    let cleaned = raw.replacen('%', "", 1);
    let cleaned = cleaned.trim();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, ch) in cleaned.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    cleaned[..end].trim_end_matches('.').parse().ok()
}
