#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cooling site, street tree, and census tract types.
//!
//! These are the plain records that flow between the loader, the tract
//! aggregator, and the buffer builder. None of them perform I/O; they are
//! constructed once per pipeline run and handed to the presentation layer
//! as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of trailing GEOID characters that form the tract join key.
pub const TRACT_SUFFIX_LEN: usize = 6;

/// Derives the 6-character tract code (`tract_2010`) from a GEOID.
///
/// GEOIDs shorter than six characters are returned whole.
#[must_use]
pub fn tract_suffix(geoid: &str) -> String {
    let len = geoid.chars().count();
    geoid
        .chars()
        .skip(len.saturating_sub(TRACT_SUFFIX_LEN))
        .collect()
}

/// A public cooling site (library, community center, pool, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolingSite {
    /// Source identifier, or the zero-based row index when the source has
    /// no identifier column configured.
    pub id: String,
    /// Easting in the planar reference (US survey feet).
    pub x: f64,
    /// Northing in the planar reference (US survey feet).
    pub y: f64,
    /// WGS84 longitude derived from `x`/`y`.
    pub longitude: f64,
    /// WGS84 latitude derived from `x`/`y`.
    pub latitude: f64,
    /// Remaining source columns, keyed by normalized column name.
    pub properties: BTreeMap<String, String>,
}

/// A single street tree from the tree census.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePoint {
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Census tract identifier as provided by the tree census.
    pub tract: String,
}

/// A census tract statistics row before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractStatistics {
    /// Full geographic identifier from the first source column.
    pub geoid: String,
    /// Last six characters of `geoid`.
    pub tract_2010: String,
    /// Remaining source columns (trimmed header -> raw value).
    pub statistics: BTreeMap<String, String>,
}

impl TractStatistics {
    /// Builds a statistics row, deriving `tract_2010` from `geoid`.
    #[must_use]
    pub fn new(geoid: impl Into<String>, statistics: BTreeMap<String, String>) -> Self {
        let geoid = geoid.into();
        let tract_2010 = tract_suffix(&geoid);
        Self {
            geoid,
            tract_2010,
            statistics,
        }
    }
}

/// A census tract annotated with its tree count and risk index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractRecord {
    /// Full geographic identifier.
    pub geoid: String,
    /// Six-character tract code used as the join key.
    pub tract_2010: String,
    /// Number of street trees recorded in this tract.
    pub tree_count: u64,
    /// Percentile rank of `tree_count` among all tracts, in `(0, 1]`.
    /// Lower means fewer trees and higher heat vulnerability.
    pub risk_index: f64,
    /// Pass-through population statistics.
    pub statistics: BTreeMap<String, String>,
}

/// A circular coverage buffer around a cooling site, in WGS84.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferPolygon {
    /// Identifier of the source cooling site.
    pub site_id: String,
    /// `[longitude, latitude]` of the source cooling site.
    pub center: [f64; 2],
    /// Buffer radius in US survey feet.
    pub radius_ft: f64,
    /// Closed exterior ring as `[longitude, latitude]` pairs,
    /// counter-clockwise.
    pub exterior: Vec<[f64; 2]>,
}

/// One row of the summary preview table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractPreview {
    /// Six-character tract code.
    pub tract_2010: String,
    /// Trees counted in the tract.
    pub tree_count: u64,
}

/// Headline numbers for the tract analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Number of tract statistics rows.
    pub total_tracts: usize,
    /// Mean `tree_count` across all tracts (0 when there are none).
    pub mean_trees_per_tract: f64,
    /// Trees whose tract identifier matched at least one tract row.
    pub matched_trees: u64,
    /// Trees whose tract identifier matched no tract row.
    pub unmatched_trees: u64,
    /// Size of the high-priority view.
    pub high_priority_tracts: usize,
    /// First rows of the analysis table.
    pub preview: Vec<TractPreview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_takes_last_six_characters() {
        assert_eq!(tract_suffix("1400000US36005000100"), "000100");
        assert_eq!(tract_suffix("36061000200"), "000200");
    }

    #[test]
    fn suffix_of_short_geoid_is_whole_string() {
        assert_eq!(tract_suffix("1234"), "1234");
        assert_eq!(tract_suffix(""), "");
    }

    #[test]
    fn statistics_row_derives_suffix() {
        let row = TractStatistics::new("36047000700", BTreeMap::new());
        assert_eq!(row.geoid, "36047000700");
        assert_eq!(row.tract_2010, "000700");
    }
}
