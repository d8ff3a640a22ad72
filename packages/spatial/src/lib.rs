#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Planar projection and buffering for cooling sites.
//!
//! Cooling sites arrive in a foot-based state plane reference and are
//! stored in WGS84. Buffering has to happen in the planar reference so the
//! radius is uniform, so this package owns both directions of the
//! projection, the circular buffer builder, and the `GeoJSON` export used
//! by the presentation layer.

pub mod buffer;
pub mod features;
pub mod projection;

pub use buffer::BufferBuilder;
pub use projection::StatePlane;

use thiserror::Error;

/// Errors raised while converting between geographic and planar
/// coordinates.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The requested CRS code has no built-in definition.
    #[error("Unsupported planar CRS: {code}")]
    UnsupportedCrs {
        /// The code as given (e.g. `"EPSG:3857"`).
        code: String,
    },

    /// An input or output coordinate was NaN or infinite.
    #[error("Non-finite coordinate ({x}, {y})")]
    NonFinite {
        /// First ordinate (longitude or easting).
        x: f64,
        /// Second ordinate (latitude or northing).
        y: f64,
    },
}

/// Errors raised while building cooling-site buffers.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Radius was zero, negative, or not finite.
    #[error("Invalid buffer radius: {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// A circle needs at least one segment per quadrant.
    #[error("Invalid quadrant segment count: {segments}")]
    InvalidSegments {
        /// The rejected segment count.
        segments: u32,
    },

    /// Reprojection failed for a site.
    #[error("Projection failed for cooling site {site_id}: {source}")]
    Projection {
        /// The cooling site being buffered.
        site_id: String,
        /// Underlying projection error.
        source: ProjectionError,
    },

    /// The buffer came out with zero area.
    #[error("Degenerate buffer for cooling site {site_id}")]
    Degenerate {
        /// The cooling site being buffered.
        site_id: String,
    },
}
