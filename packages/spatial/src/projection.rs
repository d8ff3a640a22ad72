//! Lambert Conformal Conic state plane projection.
//!
//! Implements the two-standard-parallel ellipsoidal form of the projection
//! so cooling-site coordinates can be moved between a US state plane zone
//! (in US survey feet) and WGS84 longitude/latitude. NAD83 and WGS84 are
//! treated as the same datum, which is well under a foot of error at city
//! scale.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{Coord, MapCoords as _, Point, Polygon};

use crate::ProjectionError;

/// Meters per US survey foot.
pub const US_SURVEY_FOOT_M: f64 = 1200.0 / 3937.0;

/// GRS80 semi-major axis in meters.
const GRS80_A: f64 = 6_378_137.0;

/// GRS80 inverse flattening.
const GRS80_INV_F: f64 = 298.257_222_101;

/// Convergence threshold for the inverse latitude iteration, in radians.
const LATITUDE_EPSILON: f64 = 1e-12;

/// Upper bound on inverse latitude iterations.
const MAX_LATITUDE_ITERATIONS: usize = 32;

/// Defining parameters of a Lambert Conformal Conic zone, in degrees and
/// meters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoneParameters {
    standard_parallel_1: f64,
    standard_parallel_2: f64,
    latitude_of_origin: f64,
    central_meridian: f64,
    false_easting_m: f64,
    false_northing_m: f64,
}

/// NAD83 / New York Long Island (ftUS).
const NEW_YORK_LONG_ISLAND: ZoneParameters = ZoneParameters {
    standard_parallel_1: 41.0 + 2.0 / 60.0,
    standard_parallel_2: 40.0 + 40.0 / 60.0,
    latitude_of_origin: 40.0 + 10.0 / 60.0,
    central_meridian: -74.0,
    false_easting_m: 300_000.0,
    false_northing_m: 0.0,
};

/// Known state plane zones by EPSG code.
const ZONES: &[(u32, ZoneParameters)] = &[(2263, NEW_YORK_LONG_ISLAND)];

/// A state plane zone in US survey feet, with precomputed projection
/// constants.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePlane {
    epsg: u32,
    e: f64,
    n: f64,
    a_f: f64,
    rho0: f64,
    lambda0: f64,
    false_easting_m: f64,
    false_northing_m: f64,
}

impl StatePlane {
    /// EPSG:2263, NAD83 / New York Long Island (ftUS). Covers all five
    /// boroughs of New York City.
    #[must_use]
    pub fn new_york_long_island() -> Self {
        Self::from_parameters(2263, NEW_YORK_LONG_ISLAND)
    }

    /// Looks up a zone by code. Accepts `"EPSG:2263"`, `"epsg:2263"`, or a
    /// bare `"2263"`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnsupportedCrs`] if the code is malformed
    /// or has no built-in definition.
    pub fn from_code(code: &str) -> Result<Self, ProjectionError> {
        let trimmed = code.trim();
        let digits = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map_or(trimmed, |_| &trimmed[5..]);

        let epsg: u32 = digits
            .parse()
            .map_err(|_| ProjectionError::UnsupportedCrs {
                code: code.to_string(),
            })?;

        ZONES
            .iter()
            .find(|(known, _)| *known == epsg)
            .map(|(known, params)| Self::from_parameters(*known, *params))
            .ok_or_else(|| ProjectionError::UnsupportedCrs {
                code: code.to_string(),
            })
    }

    fn from_parameters(epsg: u32, params: ZoneParameters) -> Self {
        let f = 1.0 / GRS80_INV_F;
        let e = f.mul_add(-f, 2.0 * f).sqrt();

        let phi1 = params.standard_parallel_1.to_radians();
        let phi2 = params.standard_parallel_2.to_radians();
        let phi0 = params.latitude_of_origin.to_radians();

        let m1 = conformal_m(phi1, e);
        let m2 = conformal_m(phi2, e);
        let t1 = conformal_t(phi1, e);
        let t2 = conformal_t(phi2, e);
        let t0 = conformal_t(phi0, e);

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let big_f = m1 / (n * t1.powf(n));
        let a_f = GRS80_A * big_f;

        Self {
            epsg,
            e,
            n,
            a_f,
            rho0: a_f * t0.powf(n),
            lambda0: params.central_meridian.to_radians(),
            false_easting_m: params.false_easting_m,
            false_northing_m: params.false_northing_m,
        }
    }

    /// The zone's EPSG code.
    #[must_use]
    pub const fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Projects a WGS84 `(longitude, latitude)` point to planar feet.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::NonFinite`] if the input or result is not
    /// finite (e.g. a pole).
    pub fn to_planar(&self, geographic: Point<f64>) -> Result<Point<f64>, ProjectionError> {
        self.forward(geographic.0).map(Point::from)
    }

    /// Unprojects a planar `(x, y)` point in feet to WGS84
    /// `(longitude, latitude)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::NonFinite`] if the input or result is not
    /// finite.
    pub fn to_geographic(&self, planar: Point<f64>) -> Result<Point<f64>, ProjectionError> {
        self.inverse(planar.0).map(Point::from)
    }

    /// Unprojects every vertex of a planar polygon.
    ///
    /// # Errors
    ///
    /// Returns the first vertex failure.
    pub fn polygon_to_geographic(
        &self,
        planar: &Polygon<f64>,
    ) -> Result<Polygon<f64>, ProjectionError> {
        planar.try_map_coords(|coord| self.inverse(coord))
    }

    fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        ensure_finite(coord)?;

        let phi = coord.y.to_radians();
        let lambda = coord.x.to_radians();

        let rho = self.a_f * conformal_t(phi, self.e).powf(self.n);
        let theta = self.n * (lambda - self.lambda0);

        let x_m = rho.mul_add(theta.sin(), self.false_easting_m);
        let y_m = rho.mul_add(-theta.cos(), self.rho0) + self.false_northing_m;

        let out = Coord {
            x: x_m / US_SURVEY_FOOT_M,
            y: y_m / US_SURVEY_FOOT_M,
        };
        ensure_finite(out)?;
        Ok(out)
    }

    fn inverse(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        ensure_finite(coord)?;

        let mut dx = coord.x.mul_add(US_SURVEY_FOOT_M, -self.false_easting_m);
        let mut dy = self.rho0 - coord.y.mul_add(US_SURVEY_FOOT_M, -self.false_northing_m);
        if self.n < 0.0 {
            dx = -dx;
            dy = -dy;
        }

        let rho = self.n.signum() * dx.hypot(dy);
        let theta = dx.atan2(dy);
        let t = (rho / self.a_f).powf(1.0 / self.n);

        let lambda = theta / self.n + self.lambda0;

        let half_e = self.e / 2.0;
        let mut phi = 2.0f64.mul_add(-t.atan(), FRAC_PI_2);
        for _ in 0..MAX_LATITUDE_ITERATIONS {
            let es = self.e * phi.sin();
            let next = 2.0f64.mul_add(
                -(t * ((1.0 - es) / (1.0 + es)).powf(half_e)).atan(),
                FRAC_PI_2,
            );
            let delta = (next - phi).abs();
            phi = next;
            if delta < LATITUDE_EPSILON {
                break;
            }
        }

        let out = Coord {
            x: lambda.to_degrees(),
            y: phi.to_degrees(),
        };
        ensure_finite(out)?;
        Ok(out)
    }
}

fn ensure_finite(coord: Coord<f64>) -> Result<(), ProjectionError> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFinite {
            x: coord.x,
            y: coord.y,
        })
    }
}

fn conformal_m(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    phi.cos() / es.mul_add(-es, 1.0).sqrt()
}

fn conformal_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}
