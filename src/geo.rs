//! Geographic coordinates and their mapping to unit vectors.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Spherical-to-Cartesian conversion on the unit sphere.
    #[inline]
    pub fn to_unit_vector(self) -> DVec3 {
        let phi = self.lat.to_radians();
        let theta = self.lng.to_radians();
        let cos_phi = phi.cos();
        DVec3::new(theta.cos() * cos_phi, theta.sin() * cos_phi, phi.sin())
    }

    /// Inverse of [`GeoPoint::to_unit_vector`] via `atan2`.
    ///
    /// Undefined for the zero vector; any non-zero vector (unit or not)
    /// round-trips to floating-point precision.
    #[inline]
    pub fn from_unit_vector(v: DVec3) -> Self {
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
        let lng = v.y.atan2(v.x);
        Self {
            lat: lat.to_degrees(),
            lng: lng.to_degrees(),
        }
    }
}

/// An axis-aligned latitude/longitude box, used as the viewport filter.
///
/// Does not model antimeridian wrapping; viewports spanning ±180° are split
/// by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest box containing all points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.lat, first.lng, first.lat, first.lng);
        for p in &points[1..] {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lng);
        self.east = self.east.max(p.lng);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    pub fn contains_point(&self, p: GeoPoint) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    /// `other` lies entirely inside this box.
    pub fn contains(&self, other: &LatLngBounds) -> bool {
        other.south >= self.south
            && other.north <= self.north
            && other.west >= self.west
            && other.east <= self.east
    }

    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        self.south <= other.north
            && self.north >= other.south
            && self.west <= other.east
            && self.east >= other.west
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_vector_round_trip() {
        let samples = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(47.6062, -122.3321),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(89.9, 179.9),
            GeoPoint::new(-89.9, -179.9),
        ];
        for p in samples {
            let back = GeoPoint::from_unit_vector(p.to_unit_vector());
            assert!(
                (back.lat - p.lat).abs() < 1e-9 && (back.lng - p.lng).abs() < 1e-9,
                "round trip drifted: {:?} -> {:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn test_unit_vector_is_unit_length() {
        let v = GeoPoint::new(12.34, 56.78).to_unit_vector();
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_contains_and_intersects() {
        let outer = LatLngBounds::new(0.0, 0.0, 10.0, 10.0);
        let inner = LatLngBounds::new(2.0, 2.0, 8.0, 8.0);
        let overlapping = LatLngBounds::new(5.0, 5.0, 15.0, 15.0);
        let disjoint = LatLngBounds::new(20.0, 20.0, 30.0, 30.0);

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&overlapping));
        assert!(outer.intersects(&overlapping));
        assert!(!outer.intersects(&disjoint));
        assert!(outer.contains_point(GeoPoint::new(5.0, 5.0)));
        assert!(!outer.contains_point(GeoPoint::new(-1.0, 5.0)));
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            GeoPoint::new(1.0, 7.0),
            GeoPoint::new(-2.0, 3.0),
            GeoPoint::new(4.0, 5.0),
        ];
        let b = LatLngBounds::from_points(&pts).unwrap();
        assert_eq!(b, LatLngBounds::new(-2.0, 3.0, 4.0, 7.0));
        assert!(LatLngBounds::from_points(&[]).is_none());
    }
}
