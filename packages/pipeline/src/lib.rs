#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch pipeline for the cooling access and tree density heat map.
//!
//! Runs Loader -> {Aggregator, Buffer Builder} over three static CSV files
//! and returns everything the map needs: the ranked tract table, the
//! cooling-site points, and their coverage buffers. [`run`] is a pure
//! function of the input bytes and options; [`cache::PipelineCache`] adds
//! optional memoization keyed on file contents.

pub mod cache;
pub mod config;
pub mod output;

use std::path::PathBuf;

use heat_map_analytics::{AnalyticsError, TractAnalysis};
use heat_map_ingest::{LoadError, TreeCensus};
use heat_map_models::{BufferPolygon, CoolingSite, TractRecord, TractStatistics};
use heat_map_spatial::{BufferBuilder, BufferError, ProjectionError};
use thiserror::Error;

pub use config::{PipelineConfig, PipelineOptions};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input table failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A cooling-site buffer could not be built.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Tract ranking failed.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// The configured planar reference is unknown.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A configuration value is missing or out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        /// Configuration file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        /// Configuration file path.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// An output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Output {
        /// Output file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A CSV output could not be written.
    #[error("Failed to write CSV {path}: {source}")]
    OutputCsv {
        /// Output file path.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Locations of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    /// Cooling sites CSV.
    pub cooling: PathBuf,
    /// Street tree census CSV.
    pub trees: PathBuf,
    /// Tract statistics CSV.
    pub tracts: PathBuf,
}

/// The three input tables, read fully into memory.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Labels used in diagnostics (normally the file paths).
    pub labels: InputLabels,
    /// Cooling sites CSV bytes.
    pub cooling: Vec<u8>,
    /// Street tree census CSV bytes.
    pub trees: Vec<u8>,
    /// Tract statistics CSV bytes.
    pub tracts: Vec<u8>,
}

/// Human-readable names for each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLabels {
    /// Cooling sites label.
    pub cooling: String,
    /// Street tree census label.
    pub trees: String,
    /// Tract statistics label.
    pub tracts: String,
}

impl InputData {
    /// Reads all three files.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Load`] if any file cannot be read.
    pub fn read(files: &InputFiles) -> Result<Self, PipelineError> {
        Ok(Self {
            labels: InputLabels {
                cooling: files.cooling.display().to_string(),
                trees: files.trees.display().to_string(),
                tracts: files.tracts.display().to_string(),
            },
            cooling: heat_map_ingest::read_source(&files.cooling)?,
            trees: heat_map_ingest::read_source(&files.trees)?,
            tracts: heat_map_ingest::read_source(&files.tracts)?,
        })
    }

    /// Wraps in-memory tables, labelled `cooling`, `trees`, and `tracts`.
    #[must_use]
    pub fn from_bytes(cooling: Vec<u8>, trees: Vec<u8>, tracts: Vec<u8>) -> Self {
        Self {
            labels: InputLabels {
                cooling: "cooling".to_string(),
                trees: "trees".to_string(),
                tracts: "tracts".to_string(),
            },
            cooling,
            trees,
            tracts,
        }
    }
}

/// Output of the Loader stage.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    /// Cooling sites in WGS84.
    pub cooling_sites: Vec<CoolingSite>,
    /// Tree points plus drop statistics.
    pub trees: TreeCensus,
    /// Tract statistics with derived join keys.
    pub tracts: Vec<TractStatistics>,
}

/// Everything the presentation layer consumes.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Ranked tract table with its high-priority view.
    pub analysis: TractAnalysis,
    /// Cooling sites in WGS84.
    pub cooling_sites: Vec<CoolingSite>,
    /// One coverage buffer per cooling site, in WGS84.
    pub buffers: Vec<BufferPolygon>,
    /// Trees kept after dropping rows without coordinates.
    pub trees_loaded: usize,
    /// Tree rows dropped for missing coordinates.
    pub trees_dropped: usize,
    /// Name of the detected tract column in the tree census.
    pub tract_column: String,
}

impl PipelineOutput {
    /// All tract rows.
    #[must_use]
    pub fn tracts(&self) -> &[TractRecord] {
        self.analysis.records()
    }

    /// Tracts in the high-priority view.
    pub fn high_priority(&self) -> impl Iterator<Item = &TractRecord> {
        self.analysis.high_priority()
    }
}

/// Runs only the Loader/Normalizer stage.
///
/// # Errors
///
/// Returns the first [`LoadError`] from any of the three tables.
pub fn load(data: &InputData, options: &PipelineOptions) -> Result<LoadedInputs, PipelineError> {
    let cooling_sites = heat_map_ingest::load_cooling_sites(
        data.cooling.as_slice(),
        &data.labels.cooling,
        &options.cooling,
        &options.plane,
    )?;
    let trees = heat_map_ingest::load_tree_points(data.trees.as_slice(), &data.labels.trees)?;
    let tracts = heat_map_ingest::load_tract_statistics(
        data.tracts.as_slice(),
        &data.labels.tracts,
        options.tracts,
    )?;

    Ok(LoadedInputs {
        cooling_sites,
        trees,
        tracts,
    })
}

/// Runs the full pipeline over in-memory inputs.
///
/// # Errors
///
/// Returns a [`PipelineError`] from whichever stage fails first; no
/// partial output is produced.
pub fn run(data: &InputData, options: &PipelineOptions) -> Result<PipelineOutput, PipelineError> {
    log::info!("Loading inputs...");
    let loaded = load(data, options)?;

    log::info!("Aggregating trees by tract...");
    let analysis = TractAnalysis::build(
        loaded.tracts,
        &loaded.trees.points,
        options.priority_threshold,
    )?;

    log::info!("Building cooling buffers...");
    let builder = BufferBuilder::new(
        options.plane.clone(),
        options.radius_ft,
        options.quadrant_segments,
    )?;
    let buffers = builder.build(&loaded.cooling_sites)?;

    Ok(PipelineOutput {
        analysis,
        cooling_sites: loaded.cooling_sites,
        buffers,
        trees_loaded: loaded.trees.points.len(),
        trees_dropped: loaded.trees.dropped,
        tract_column: loaded.trees.tract_column,
    })
}
