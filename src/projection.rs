//! Cube-face projection with the S2-style quadratic area warp.
//!
//! A point on the unit sphere maps to one of six cube faces and a UV
//! coordinate in (-1, 1)² on that face. UV is warped to ST in (0, 1)² before
//! discretization so that cells near face edges cover roughly the same
//! surface area as cells near face centers.

use glam::DVec3;

/// Pick the face whose axis holds the vector's largest-magnitude component.
///
/// Faces 0..3 are +x, +y, +z; faces 3..6 are -x, -y, -z. Exact-magnitude ties
/// resolve in axis order x, y, z (a measure-zero boundary case).
#[inline]
pub(crate) fn select_face(p: DVec3) -> u8 {
    let (ax, ay, az) = (p.x.abs(), p.y.abs(), p.z.abs());
    let axis = if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    };
    let component = match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    };
    if component < 0.0 {
        axis + 3
    } else {
        axis
    }
}

/// Project onto a face, producing UV in (-1, 1)².
///
/// Panics on a face id outside 0..6: that can only come from a projection
/// bug, never from user input.
#[inline]
pub(crate) fn face_uv(face: u8, p: DVec3) -> (f64, f64) {
    match face {
        0 => (p.y / p.x, p.z / p.x),
        1 => (-p.x / p.y, p.z / p.y),
        2 => (-p.x / p.z, -p.y / p.z),
        3 => (p.z / p.x, p.y / p.x),
        4 => (p.z / p.y, -p.x / p.y),
        5 => (-p.y / p.z, -p.x / p.z),
        _ => unreachable!("invalid cube face {}", face),
    }
}

/// Inverse of [`face_uv`]: a (non-normalized) vector through the face point.
#[inline]
pub(crate) fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> DVec3 {
    match face {
        0 => DVec3::new(1.0, u, v),
        1 => DVec3::new(-u, 1.0, v),
        2 => DVec3::new(-u, -v, 1.0),
        3 => DVec3::new(-1.0, -v, -u),
        4 => DVec3::new(v, -1.0, -u),
        5 => DVec3::new(v, u, -1.0),
        _ => unreachable!("invalid cube face {}", face),
    }
}

/// Quadratic warp, UV (-1, 1) → ST (0, 1).
#[inline]
pub(crate) fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

/// Exact analytic inverse of [`uv_to_st`], ST (0, 1) → UV (-1, 1).
#[inline]
pub(crate) fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
    }
}
