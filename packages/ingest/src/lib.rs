#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the three civic input tables and normalizes them into typed
//! records.
//!
//! - Cooling sites: planar `x`/`y` strings with thousands separators,
//!   unprojected to WGS84.
//! - Street tree census: WGS84 points tagged with a census tract code.
//!   Rows without coordinates are dropped.
//! - Tract statistics: GEOID in the first column, reduced to the
//!   six-character `tract_2010` join key.
//!
//! Every failure carries the file label, and where relevant the row and
//! column, so the input can be fixed by hand.

pub mod cooling;
pub mod table;
pub mod tracts;
pub mod trees;

use std::path::Path;

use heat_map_spatial::ProjectionError;
use thiserror::Error;

pub use cooling::{CoolingOptions, load_cooling_sites};
pub use tracts::{TractOptions, load_tract_statistics};
pub use trees::{TreeCensus, find_tract_column, load_tree_points};

/// Errors that can occur while loading input tables.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file could not be read.
    #[error("Failed to read {file}: {source}")]
    Io {
        /// Path or label of the input.
        file: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV reader rejected the input.
    #[error("CSV error in {file}: {source}")]
    Csv {
        /// Path or label of the input.
        file: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The table has no header columns.
    #[error("{file} has no columns")]
    EmptyTable {
        /// Path or label of the input.
        file: String,
    },

    /// A required column is absent after header normalization.
    #[error("{file} is missing required column '{column}'")]
    MissingColumn {
        /// Path or label of the input.
        file: String,
        /// Normalized column name that was expected.
        column: String,
    },

    /// A coordinate value could not be parsed as a number.
    #[error("{file}: malformed coordinate in row {row} (line {line}), field '{field}': {value:?}")]
    MalformedCoordinate {
        /// Path or label of the input.
        file: String,
        /// Zero-based data row index.
        row: usize,
        /// One-based line number in the file.
        line: u64,
        /// Column holding the bad value.
        field: String,
        /// The raw value as read.
        value: String,
    },

    /// No column name contains the tract pattern.
    #[error("{file} has no census tract column (columns: {columns})")]
    NoTractColumn {
        /// Path or label of the input.
        file: String,
        /// All normalized column names, comma separated.
        columns: String,
    },

    /// More than one column name contains the tract pattern.
    #[error("{file} has multiple census tract columns: {}", .candidates.join(", "))]
    AmbiguousTractColumn {
        /// Path or label of the input.
        file: String,
        /// Every matching column name.
        candidates: Vec<String>,
    },

    /// A cooling site could not be unprojected.
    #[error("{file}: cannot project row {row}: {source}")]
    Projection {
        /// Path or label of the input.
        file: String,
        /// Zero-based data row index.
        row: usize,
        /// Underlying projection error.
        source: ProjectionError,
    },
}

/// Reads an input file fully into memory.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read.
pub fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        file: path.display().to_string(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}
