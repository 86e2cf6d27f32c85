//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Link decisions compare
//! distances against transmission ranges with a non-strict `<=`, so the
//! boundary must be resolved at sub-metre precision.

use crate::{V2vError, V2vResult};

/// Mean Earth radius, metres.  Shared by edge-length and link computations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude (and of longitude at the equator).
pub const METRES_PER_DEGREE: f64 = 111_320.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`new`](Self::new) but rejects non-finite or out-of-range values.
    pub fn try_new(lat: f64, lon: f64) -> V2vResult<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(V2vError::InvalidCoordinate { lat, lon })
        }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Shift by `north_m` / `east_m` metres using a local flat-earth
    /// approximation.  Good to well under 1 % over a few kilometres.
    pub fn offset_m(self, north_m: f64, east_m: f64) -> GeoPoint {
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-6);
        GeoPoint {
            lat: self.lat + north_m / METRES_PER_DEGREE,
            lon: self.lon + east_m / (METRES_PER_DEGREE * cos_lat),
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Bounding box ──────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon bounding box accumulated from a set of points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    /// Bounds of `points`, or `None` when the iterator is empty.
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = GeoBounds { min: first, max: first };
        for p in iter {
            bounds.min.lat = bounds.min.lat.min(p.lat);
            bounds.min.lon = bounds.min.lon.min(p.lon);
            bounds.max.lat = bounds.max.lat.max(p.lat);
            bounds.max.lon = bounds.max.lon.max(p.lon);
        }
        Some(bounds)
    }

    /// Great-circle length of the min→max diagonal, metres.
    #[inline]
    pub fn diagonal_m(&self) -> f64 {
        self.min.distance_m(self.max)
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        self.min.lerp(self.max, 0.5)
    }
}
