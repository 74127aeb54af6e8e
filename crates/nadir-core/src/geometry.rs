//! Vector helpers for orientation samples.
//!
//! Everything here is pure: degenerate input produces a defined fallback
//! value instead of an error.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_MISALIGNMENT_DEGREES, ROLL_PROJECTION_EPSILON};

/// 3-component vector in the vehicle body frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const POS_Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);
    pub const NEG_Z: Vec3 = Vec3::new(0.0, 0.0, -1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale(&self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Unit vector and original norm. Zero input yields `(ZERO, 0.0)`.
pub fn normalize(v: Vec3) -> (Vec3, f64) {
    let n = v.norm();
    if n == 0.0 {
        return (Vec3::ZERO, 0.0);
    }
    (Vec3::new(v.x / n, v.y / n, v.z / n), n)
}

/// Angle in degrees between `look` and `target`, in [0, 180].
///
/// A zero-length vector on either side is treated as maximally misaligned
/// and yields 180.
pub fn angle_to_target(look: Vec3, target: Vec3) -> f64 {
    let (u, nu) = normalize(look);
    let (t, nt) = normalize(target);
    if nu == 0.0 || nt == 0.0 {
        return MAX_MISALIGNMENT_DEGREES;
    }
    let dot = u.dot(&t);
    if !dot.is_finite() {
        return MAX_MISALIGNMENT_DEGREES;
    }
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Body plane a sample is projected onto to obtain a roll angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionPlane {
    #[default]
    XY,
    XZ,
    YZ,
}

impl std::fmt::Display for ProjectionPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XY => write!(f, "XY"),
            Self::XZ => write!(f, "XZ"),
            Self::YZ => write!(f, "YZ"),
        }
    }
}

/// Roll angle of `v` inside `plane`, in degrees wrapped to [0, 360).
///
/// Measured counter-clockwise from the plane's first axis toward its second.
/// Returns `None` when the projection is too short to define a direction.
pub fn roll_degrees(v: Vec3, plane: ProjectionPlane) -> Option<f64> {
    let (a, b) = match plane {
        ProjectionPlane::XY => (v.x, v.y),
        ProjectionPlane::XZ => (v.x, v.z),
        ProjectionPlane::YZ => (v.y, v.z),
    };
    let len = (a * a + b * b).sqrt();
    if !len.is_finite() || len < ROLL_PROJECTION_EPSILON {
        return None;
    }
    Some(wrap_degrees(b.atan2(a).to_degrees()))
}

/// Wrap an angle in degrees into [0, 360).
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
