//! Fixed-radius coverage buffers around cooling sites.
//!
//! Each site is moved into the planar reference, buffered with a regular
//! polygon approximating a circle, and the ring is moved back to WGS84.
//! Buffering directly in degrees would stretch the circle east-west.

use std::f64::consts::TAU;

use geo::{Area as _, Coord, LineString, Point, Polygon};
use heat_map_models::{BufferPolygon, CoolingSite};

use crate::{BufferError, StatePlane};

/// Default coverage radius in feet (roughly a ten minute walk).
pub const DEFAULT_RADIUS_FT: f64 = 800.0;

/// Default number of segments per quarter circle.
pub const DEFAULT_QUADRANT_SEGMENTS: u32 = 16;

/// Builds a closed, counter-clockwise circle approximation around `center`.
#[must_use]
pub fn circle(center: Coord<f64>, radius: f64, quadrant_segments: u32) -> Polygon<f64> {
    let total = quadrant_segments.max(1) * 4;
    let step = TAU / f64::from(total);

    let mut ring: Vec<Coord<f64>> = (0..total)
        .map(|i| {
            let angle = step * f64::from(i);
            Coord {
                x: radius.mul_add(angle.cos(), center.x),
                y: radius.mul_add(angle.sin(), center.y),
            }
        })
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }

    Polygon::new(LineString::from(ring), vec![])
}

/// Produces one [`BufferPolygon`] per cooling site.
#[derive(Debug, Clone)]
pub struct BufferBuilder {
    plane: StatePlane,
    radius_ft: f64,
    quadrant_segments: u32,
}

impl BufferBuilder {
    /// Creates a builder for the given planar reference.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidRadius`] if `radius_ft` is not a
    /// positive finite number, or [`BufferError::InvalidSegments`] if
    /// `quadrant_segments` is zero.
    pub fn new(
        plane: StatePlane,
        radius_ft: f64,
        quadrant_segments: u32,
    ) -> Result<Self, BufferError> {
        if !radius_ft.is_finite() || radius_ft <= 0.0 {
            return Err(BufferError::InvalidRadius { radius: radius_ft });
        }
        if quadrant_segments == 0 {
            return Err(BufferError::InvalidSegments {
                segments: quadrant_segments,
            });
        }

        Ok(Self {
            plane,
            radius_ft,
            quadrant_segments,
        })
    }

    /// The buffer radius in feet.
    #[must_use]
    pub const fn radius_ft(&self) -> f64 {
        self.radius_ft
    }

    /// Buffers a single cooling site.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Projection`] if the site cannot be reprojected
    /// and [`BufferError::Degenerate`] if the planar buffer has no area.
    pub fn buffer_site(&self, site: &CoolingSite) -> Result<BufferPolygon, BufferError> {
        let projection_err = |source| BufferError::Projection {
            site_id: site.id.clone(),
            source,
        };

        let planar = self
            .plane
            .to_planar(Point::new(site.longitude, site.latitude))
            .map_err(projection_err)?;

        let planar_buffer = circle(planar.0, self.radius_ft, self.quadrant_segments);
        if planar_buffer.unsigned_area() <= 0.0 {
            return Err(BufferError::Degenerate {
                site_id: site.id.clone(),
            });
        }

        let geographic = self
            .plane
            .polygon_to_geographic(&planar_buffer)
            .map_err(projection_err)?;

        Ok(BufferPolygon {
            site_id: site.id.clone(),
            center: [site.longitude, site.latitude],
            radius_ft: self.radius_ft,
            exterior: geographic
                .exterior()
                .coords()
                .map(|c| [c.x, c.y])
                .collect(),
        })
    }

    /// Buffers every cooling site, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns the first site that fails to buffer.
    pub fn build(&self, sites: &[CoolingSite]) -> Result<Vec<BufferPolygon>, BufferError> {
        let buffers = sites
            .iter()
            .map(|site| self.buffer_site(site))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Built {} cooling buffers ({} ft radius, EPSG:{})",
            buffers.len(),
            self.radius_ft,
            self.plane.epsg()
        );

        Ok(buffers)
    }
}
