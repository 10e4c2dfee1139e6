//! Cell addressing on the cube-face grid.
//!
//! A [`CellId`] names one square of the `2^level × 2^level` grid on one cube
//! face. Cells at the same level tile the sphere without gaps or overlaps.
//! All operations here are pure functions of the cell identity.


use std::fmt;

use glam::DVec3;

use crate::geo::{GeoPoint, LatLngBounds};
use crate::projection::{face_uv, face_uv_to_xyz, select_face, st_to_uv, uv_to_st};

/// Highest supported subdivision level (indices fit a `u32`).
pub const MAX_LEVEL: u8 = 30;

/// The four axis-aligned neighbor deltas.
pub const EDGE_DELTAS: [(i64, i64); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Identity of one grid cell: cube face, subdivision level and integer
/// `(i, j)` position with `i, j ∈ [0, 2^level)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub face: u8,
    pub level: u8,
    pub i: u32,
    pub j: u32,
}

/// Number of cells along one face edge at `level`.
#[inline]
fn max_size(level: u8) -> u32 {
    1u32 << level
}

#[inline]
fn discretize(st: f64, level: u8) -> u32 {
    let max = max_size(level);
    // Clamp absorbs floating-point overflow at exactly st == 1.0.
    let ij = (st * max as f64).floor();
    (ij.max(0.0) as u32).min(max - 1)
}

impl CellId {
    /// Cell containing `point` at `level`.
    ///
    /// Returns `None` for non-finite coordinates or a level above
    /// [`MAX_LEVEL`]; those inputs are excluded rather than panicking.
    pub fn from_geo(point: GeoPoint, level: u8) -> Option<CellId> {
        if !point.is_finite() || level > MAX_LEVEL {
            return None;
        }
        Some(Self::from_unit_vector(point.to_unit_vector(), level))
    }

    /// Cell containing the direction `v` at `level`. `v` must be non-zero.
    pub fn from_unit_vector(v: DVec3, level: u8) -> CellId {
        let face = select_face(v);
        let (u, w) = face_uv(face, v);
        CellId {
            face,
            level,
            i: discretize(uv_to_st(u), level),
            j: discretize(uv_to_st(w), level),
        }
    }

    /// ST coordinate at fractional offset `(di, dj)` within the cell.
    #[inline]
    fn st_at(&self, di: f64, dj: f64) -> (f64, f64) {
        let max = max_size(self.level) as f64;
        ((self.i as f64 + di) / max, (self.j as f64 + dj) / max)
    }

    fn geo_at(&self, di: f64, dj: f64) -> GeoPoint {
        let (s, t) = self.st_at(di, dj);
        let xyz = face_uv_to_xyz(self.face, st_to_uv(s), st_to_uv(t));
        GeoPoint::from_unit_vector(xyz)
    }

    /// Geographic center of the cell.
    pub fn center(&self) -> GeoPoint {
        self.geo_at(0.5, 0.5)
    }

    /// The four corners in a fixed winding order, so overlay polygons never
    /// self-intersect.
    pub fn corner_latlngs(&self) -> [GeoPoint; 4] {
        [
            self.geo_at(0.0, 0.0),
            self.geo_at(0.0, 1.0),
            self.geo_at(1.0, 1.0),
            self.geo_at(1.0, 0.0),
        ]
    }

    /// Bounding box of the cell's corners, for viewport filtering.
    pub fn bounds(&self) -> LatLngBounds {
        let corners = self.corner_latlngs();
        let mut b = LatLngBounds::new(
            corners[0].lat,
            corners[0].lng,
            corners[0].lat,
            corners[0].lng,
        );
        for c in &corners[1..] {
            b.extend(*c);
        }
        b
    }

    /// The cell at `(i + di, j + dj)`, wrapping across cube edges.
    ///
    /// Inside the face this is a plain index shift. A step off the face edge
    /// is resolved by taking the center of the out-of-range cell as a point
    /// just beyond the face boundary, unprojecting it to a vector,
    /// reselecting the face and rerunning the forward pipeline at the same
    /// level. This handles the axis rotation that occurs at cube edges.
    pub fn offset(&self, di: i64, dj: i64) -> CellId {
        let max = max_size(self.level) as i64;
        let ni = self.i as i64 + di;
        let nj = self.j as i64 + dj;
        if ni >= 0 && nj >= 0 && ni < max && nj < max {
            return CellId {
                face: self.face,
                level: self.level,
                i: ni as u32,
                j: nj as u32,
            };
        }

        let s = (ni as f64 + 0.5) / max as f64;
        let t = (nj as f64 + 0.5) / max as f64;
        let xyz = face_uv_to_xyz(self.face, st_to_uv(s), st_to_uv(t));
        CellId::from_unit_vector(xyz, self.level)
    }

    /// The four edge-adjacent neighbors.
    pub fn neighbors(&self) -> [CellId; 4] {
        let mut out = [*self; 4];
        for (slot, (di, dj)) in out.iter_mut().zip(EDGE_DELTAS) {
            *slot = self.offset(di, dj);
        }
        out
    }

    /// Neighbors for arbitrary deltas (e.g. the 8-neighborhood).
    pub fn neighbors_with(&self, deltas: &[(i64, i64)]) -> Vec<CellId> {
        deltas.iter().map(|&(di, dj)| self.offset(di, dj)).collect()
    }
}

impl fmt::Display for CellId {
    /// Canonical token form, e.g. `F1ij[3,5]@17`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}ij[{},{}]@{}", self.face, self.i, self.j, self.level)
    }
}
