//! Writes pipeline results to disk for the map frontend.

use std::path::{Path, PathBuf};

use heat_map_models::TractRecord;
use heat_map_spatial::features;
use serde::Serialize;

use crate::{PipelineError, PipelineOutput};

/// All tracts, ranked.
pub const TRACTS_FILE: &str = "tracts.csv";

/// High-priority tracts only.
pub const PRIORITY_FILE: &str = "priority_tracts.csv";

/// Cooling site points.
pub const COOLING_SITES_FILE: &str = "cooling_sites.geojson";

/// Cooling site buffers.
pub const BUFFERS_FILE: &str = "cooling_buffers.geojson";

/// Headline numbers.
pub const SUMMARY_FILE: &str = "summary.json";

/// Column order of the tract tables.
const TRACT_HEADER: [&str; 4] = ["geoid", "tract_2010", "tree_count", "risk_index"];

/// Flat CSV row for a tract.
#[derive(Debug, Serialize)]
struct TractRow<'a> {
    geoid: &'a str,
    tract_2010: &'a str,
    tree_count: u64,
    risk_index: f64,
}

impl<'a> From<&'a TractRecord> for TractRow<'a> {
    fn from(record: &'a TractRecord) -> Self {
        Self {
            geoid: &record.geoid,
            tract_2010: &record.tract_2010,
            tree_count: record.tree_count,
            risk_index: record.risk_index,
        }
    }
}

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    /// Ranked tract table.
    pub tracts: PathBuf,
    /// High-priority tract table.
    pub priority: PathBuf,
    /// Cooling site points.
    pub cooling_sites: PathBuf,
    /// Cooling site buffers.
    pub buffers: PathBuf,
    /// Summary JSON.
    pub summary: PathBuf,
}

/// Writes the tract tables, `GeoJSON` layers, and summary into `dir`,
/// creating it if needed.
///
/// # Errors
///
/// Returns [`PipelineError::Output`] or [`PipelineError::OutputCsv`] if a
/// file cannot be written.
pub fn write_outputs(output: &PipelineOutput, dir: &Path) -> Result<WrittenFiles, PipelineError> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Output {
        path: dir.display().to_string(),
        source,
    })?;

    let files = WrittenFiles {
        tracts: dir.join(TRACTS_FILE),
        priority: dir.join(PRIORITY_FILE),
        cooling_sites: dir.join(COOLING_SITES_FILE),
        buffers: dir.join(BUFFERS_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    write_tract_csv(&files.tracts, output.tracts().iter())?;
    write_tract_csv(&files.priority, output.high_priority())?;

    let sites = features::cooling_sites_collection(&output.cooling_sites);
    write_file(&files.cooling_sites, &serde_json::to_string(&sites)?)?;

    let buffers = features::buffers_collection(&output.buffers);
    write_file(&files.buffers, &serde_json::to_string(&buffers)?)?;

    let summary = output.analysis.summary();
    write_file(&files.summary, &serde_json::to_string_pretty(&summary)?)?;

    log::info!(
        "Wrote {} tracts, {} sites, and {} buffers to {}",
        output.tracts().len(),
        output.cooling_sites.len(),
        output.buffers.len(),
        dir.display()
    );

    Ok(files)
}

fn write_tract_csv<'a>(
    path: &Path,
    records: impl Iterator<Item = &'a TractRecord>,
) -> Result<(), PipelineError> {
    let csv_err = |source| PipelineError::OutputCsv {
        path: path.display().to_string(),
        source,
    };

    // Header is written explicitly so an empty view still has one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(TRACT_HEADER).map_err(csv_err)?;
    let mut rows = 0usize;
    for record in records {
        writer.serialize(TractRow::from(record)).map_err(csv_err)?;
        rows += 1;
    }
    writer.flush().map_err(|source| PipelineError::Output {
        path: path.display().to_string(),
        source,
    })?;

    log::debug!("Wrote {rows} rows to {}", path.display());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    std::fs::write(path, contents).map_err(|source| PipelineError::Output {
        path: path.display().to_string(),
        source,
    })
}
