//! Street tree census loader.
//!
//! Tree census exports are large and have sparse coordinate gaps, so rows
//! with an empty latitude or longitude are dropped rather than treated as
//! errors. The census tract column is found by name, and must be unique.

use std::io::Read;

use heat_map_models::TreePoint;

use crate::LoadError;
use crate::table::{HeaderStyle, Row, Table};

/// Substring that identifies the tract column in normalized headers.
pub const TRACT_PATTERN: &str = "tract";

/// Latitude column.
pub const LATITUDE_COLUMN: &str = "latitude";

/// Longitude column.
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Result of loading the tree census.
#[derive(Debug, Clone)]
pub struct TreeCensus {
    /// Trees with both coordinates present.
    pub points: Vec<TreePoint>,
    /// Normalized name of the detected tract column.
    pub tract_column: String,
    /// Rows dropped for a missing latitude or longitude.
    pub dropped: usize,
}

/// Finds the single column whose normalized name contains
/// [`TRACT_PATTERN`].
///
/// # Errors
///
/// Returns [`LoadError::NoTractColumn`] if nothing matches and
/// [`LoadError::AmbiguousTractColumn`] if more than one column matches.
pub fn find_tract_column(headers: &[String], file: &str) -> Result<usize, LoadError> {
    let matches: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| name.contains(TRACT_PATTERN))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(LoadError::NoTractColumn {
            file: file.to_string(),
            columns: headers.join(", "),
        }),
        many => Err(LoadError::AmbiguousTractColumn {
            file: file.to_string(),
            candidates: many.iter().map(|&i| headers[i].clone()).collect(),
        }),
    }
}

/// Loads tree points from the tree census.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if `latitude` or `longitude` is
/// absent, a tract-column error from [`find_tract_column`], or
/// [`LoadError::MalformedCoordinate`] for a non-empty coordinate that is
/// not a number.
pub fn load_tree_points<R: Read>(reader: R, file: &str) -> Result<TreeCensus, LoadError> {
    let table = Table::read(reader, file, HeaderStyle::Lowercase)?;

    let lat_col = table.require(LATITUDE_COLUMN)?;
    let lng_col = table.require(LONGITUDE_COLUMN)?;
    let tract_col = find_tract_column(table.headers(), file)?;
    let tract_column = table.headers()[tract_col].clone();

    log::debug!("Using '{tract_column}' as the tract column in {file}");

    let mut points = Vec::with_capacity(table.rows().len());
    let mut dropped = 0usize;

    for row in table.rows() {
        let (Some(latitude), Some(longitude)) = (
            coordinate(&table, row, lat_col)?,
            coordinate(&table, row, lng_col)?,
        ) else {
            dropped += 1;
            continue;
        };

        points.push(TreePoint {
            latitude,
            longitude,
            tract: row.get(tract_col).to_string(),
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} tree rows without coordinates from {file}");
    }
    log::info!("Loaded {} trees from {file}", points.len());

    Ok(TreeCensus {
        points,
        tract_column,
        dropped,
    })
}

/// `Ok(None)` for an empty cell, an error for a non-numeric one.
fn coordinate(table: &Table, row: &Row, col: usize) -> Result<Option<f64>, LoadError> {
    let raw = row.get(col);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| LoadError::MalformedCoordinate {
            file: table.file().to_string(),
            row: row.index,
            line: row.line,
            field: table.headers()[col].clone(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn finds_unique_tract_column() {
        let cols = headers(&["tree_id", "boro_ct", "census tract", "latitude"]);
        assert_eq!(find_tract_column(&cols, "trees.csv").unwrap(), 2);
    }

    #[test]
    fn no_tract_column_is_an_error() {
        let cols = headers(&["tree_id", "latitude", "longitude"]);
        let err = find_tract_column(&cols, "trees.csv").unwrap_err();
        assert!(matches!(err, LoadError::NoTractColumn { .. }));
        assert!(err.to_string().contains("tree_id, latitude, longitude"));
    }

    #[test]
    fn multiple_tract_columns_are_not_guessed() {
        let cols = headers(&["census tract", "tract_2010", "latitude"]);
        let err = find_tract_column(&cols, "trees.csv").unwrap_err();
        match &err {
            LoadError::AmbiguousTractColumn { candidates, .. } => {
                assert_eq!(candidates, &["census tract", "tract_2010"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "trees.csv has multiple census tract columns: census tract, tract_2010"
        );
    }

    #[test]
    fn drops_rows_missing_coordinates() {
        let csv = "\
tree_id,Latitude,Longitude,Census Tract
1,40.71,-73.99,000100
2,,-73.98,000100
3,40.72,,000200
4,40.73,-73.97,000200
";
        let census = load_tree_points(csv.as_bytes(), "trees.csv").unwrap();
        assert_eq!(census.points.len(), 2);
        assert_eq!(census.dropped, 2);
        assert_eq!(census.tract_column, "census tract");
        assert_eq!(census.points[0].tract, "000100");
        assert_eq!(census.points[1].tract, "000200");
        assert!((census.points[1].longitude - -73.97).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_coordinate_is_fatal() {
        let csv = "latitude,longitude,tract\n40.7,west,000100\n";
        assert!(matches!(
            load_tree_points(csv.as_bytes(), "trees.csv"),
            Err(LoadError::MalformedCoordinate { ref field, row: 0, .. }) if field == "longitude"
        ));
    }

    #[test]
    fn missing_latitude_column_is_reported() {
        let csv = "lat,longitude,tract\n40.7,-73.9,000100\n";
        assert!(matches!(
            load_tree_points(csv.as_bytes(), "trees.csv"),
            Err(LoadError::MissingColumn { ref column, .. }) if column == "latitude"
        ));
    }
}
