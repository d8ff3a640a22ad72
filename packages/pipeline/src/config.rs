//! TOML pipeline configuration.
//!
//! Only the three input paths are required. Every other section falls back
//! to defaults that reproduce the standard NYC run: EPSG:2263 planar
//! coordinates, an 800 ft buffer, and a 0.25 priority cutoff.

use std::path::{Path, PathBuf};

use heat_map_analytics::DEFAULT_PRIORITY_THRESHOLD;
use heat_map_ingest::{CoolingOptions, TractOptions};
use heat_map_spatial::StatePlane;
use heat_map_spatial::buffer::{DEFAULT_QUADRANT_SEGMENTS, DEFAULT_RADIUS_FT};
use serde::Deserialize;

use crate::{InputFiles, PipelineError};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "heat_map.toml";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data/generated";

/// Default planar reference for cooling-site coordinates.
pub const DEFAULT_PLANAR_CRS: &str = "EPSG:2263";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Input file locations.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Output location.
    #[serde(default)]
    pub output: OutputConfig,
    /// Cooling site table options.
    #[serde(default)]
    pub cooling: CoolingConfig,
    /// Tract statistics table options.
    #[serde(default)]
    pub tracts: TractsConfig,
    /// Buffer geometry options.
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Ranking options.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// `[inputs]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputsConfig {
    /// Cooling sites CSV.
    pub cooling: Option<PathBuf>,
    /// Street tree census CSV.
    pub trees: Option<PathBuf>,
    /// Tract statistics CSV.
    pub tracts: Option<PathBuf>,
}

/// `[output]`
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives the generated files.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// `[cooling]`
#[derive(Debug, Clone, Deserialize)]
pub struct CoolingConfig {
    /// Site identifier column; row index when unset.
    pub id_column: Option<String>,
    /// Planar reference of the `x`/`y` columns.
    #[serde(default = "default_planar_crs")]
    pub planar_crs: String,
}

impl Default for CoolingConfig {
    fn default() -> Self {
        Self {
            id_column: None,
            planar_crs: default_planar_crs(),
        }
    }
}

/// `[tracts]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TractsConfig {
    /// Descriptive rows under the header to skip.
    #[serde(default)]
    pub label_rows: usize,
}

/// `[buffer]`
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    /// Buffer radius in feet.
    #[serde(default = "default_radius_ft")]
    pub radius_ft: f64,
    /// Segments per quarter circle.
    #[serde(default = "default_quadrant_segments")]
    pub quadrant_segments: u32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            radius_ft: default_radius_ft(),
            quadrant_segments: default_quadrant_segments(),
        }
    }
}

/// `[analysis]`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// `risk_index` cutoff for the high-priority view.
    #[serde(default = "default_priority_threshold")]
    pub priority_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            priority_threshold: default_priority_threshold(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_planar_crs() -> String {
    DEFAULT_PLANAR_CRS.to_string()
}

const fn default_radius_ft() -> f64 {
    DEFAULT_RADIUS_FT
}

const fn default_quadrant_segments() -> u32 {
    DEFAULT_QUADRANT_SEGMENTS
}

const fn default_priority_threshold() -> f64 {
    DEFAULT_PRIORITY_THRESHOLD
}

/// Resolved, validated options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Cooling loader options.
    pub cooling: CoolingOptions,
    /// Tract loader options.
    pub tracts: TractOptions,
    /// Planar reference for cooling coordinates and buffering.
    pub plane: StatePlane,
    /// Buffer radius in feet.
    pub radius_ft: f64,
    /// Segments per quarter circle.
    pub quadrant_segments: u32,
    /// High-priority cutoff.
    pub priority_threshold: f64,
}

impl PipelineConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigParse`] if the TOML is invalid.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, PipelineError> {
        toml::from_str(text).map_err(|source| PipelineError::ConfigParse {
            path: origin.display().to_string(),
            source,
        })
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigRead`] if the file cannot be read and
    /// [`PipelineError::ConfigParse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_toml(&text, path)
    }

    /// Returns the three input paths.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] naming the first input that has no
    /// path.
    pub fn input_files(&self) -> Result<InputFiles, PipelineError> {
        let require = |path: &Option<PathBuf>, name: &str| {
            path.clone().ok_or_else(|| PipelineError::Config {
                message: format!("no path configured for the {name} input ([inputs].{name})"),
            })
        };

        Ok(InputFiles {
            cooling: require(&self.inputs.cooling, "cooling")?,
            trees: require(&self.inputs.trees, "trees")?,
            tracts: require(&self.inputs.tracts, "tracts")?,
        })
    }

    /// Validates the optional sections and resolves them into
    /// [`PipelineOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for an out-of-range radius,
    /// segment count, or threshold, and [`PipelineError::Projection`] for
    /// an unknown planar CRS.
    pub fn options(&self) -> Result<PipelineOptions, PipelineError> {
        let radius_ft = self.buffer.radius_ft;
        if !radius_ft.is_finite() || radius_ft <= 0.0 {
            return Err(PipelineError::Config {
                message: format!("[buffer].radius_ft must be a positive number, got {radius_ft}"),
            });
        }
        if self.buffer.quadrant_segments == 0 {
            return Err(PipelineError::Config {
                message: "[buffer].quadrant_segments must be at least 1".to_string(),
            });
        }

        let threshold = self.analysis.priority_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(PipelineError::Config {
                message: format!(
                    "[analysis].priority_threshold must be in (0, 1], got {threshold}"
                ),
            });
        }

        Ok(PipelineOptions {
            cooling: CoolingOptions {
                id_column: self.cooling.id_column.clone(),
            },
            tracts: TractOptions {
                label_rows: self.tracts.label_rows,
            },
            plane: StatePlane::from_code(&self.cooling.planar_crs)?,
            radius_ft,
            quadrant_segments: self.buffer.quadrant_segments,
            priority_threshold: threshold,
        })
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cooling: CoolingOptions::default(),
            tracts: TractOptions::default(),
            plane: StatePlane::new_york_long_island(),
            radius_ft: DEFAULT_RADIUS_FT,
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
            priority_threshold: DEFAULT_PRIORITY_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> PipelineConfig {
        PipelineConfig::from_toml(text, Path::new("heat_map.toml")).unwrap()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(
            r#"
            [inputs]
            cooling = "cooling.csv"
            trees = "trees.csv"
            tracts = "acs.csv"
            "#,
        );

        let files = config.input_files().unwrap();
        assert_eq!(files.cooling, PathBuf::from("cooling.csv"));
        assert_eq!(files.tracts, PathBuf::from("acs.csv"));
        assert_eq!(config.output.dir, PathBuf::from(DEFAULT_OUTPUT_DIR));

        let options = config.options().unwrap();
        assert!((options.radius_ft - 800.0).abs() < f64::EPSILON);
        assert_eq!(options.quadrant_segments, 16);
        assert!((options.priority_threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(options.plane.epsg(), 2263);
        assert!(options.cooling.id_column.is_none());
        assert_eq!(options.tracts.label_rows, 0);
    }

    #[test]
    fn full_config_overrides_defaults() {
        let config = parse(
            r#"
            [inputs]
            cooling = "c.csv"
            trees = "t.csv"
            tracts = "a.csv"

            [output]
            dir = "out"

            [cooling]
            id_column = "propertyname"
            planar_crs = "epsg:2263"

            [tracts]
            label_rows = 1

            [buffer]
            radius_ft = 1320.0
            quadrant_segments = 8

            [analysis]
            priority_threshold = 0.1
            "#,
        );

        let options = config.options().unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(options.cooling.id_column.as_deref(), Some("propertyname"));
        assert_eq!(options.tracts.label_rows, 1);
        assert!((options.radius_ft - 1320.0).abs() < f64::EPSILON);
        assert_eq!(options.quadrant_segments, 8);
        assert!((options.priority_threshold - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_input_is_named() {
        let config = parse("[inputs]\ncooling = \"c.csv\"\n");
        let err = config.input_files().unwrap_err();
        assert!(err.to_string().contains("trees"), "{err}");
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_radius = parse("[buffer]\nradius_ft = -5.0\n");
        assert!(matches!(
            bad_radius.options(),
            Err(PipelineError::Config { .. })
        ));

        let bad_threshold = parse("[analysis]\npriority_threshold = 2.0\n");
        assert!(matches!(
            bad_threshold.options(),
            Err(PipelineError::Config { .. })
        ));

        let bad_crs = parse("[cooling]\nplanar_crs = \"EPSG:4326\"\n");
        assert!(matches!(
            bad_crs.options(),
            Err(PipelineError::Projection(_))
        ));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            PipelineConfig::from_toml("[inputs", Path::new("bad.toml")),
            Err(PipelineError::ConfigParse { .. })
        ));
    }
}
