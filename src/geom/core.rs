use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

/// Point or direction in Cartesian space.
///
/// Mesh buffers stay `[f64; 3]`; this type is for the arithmetic in between.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or `None` for a zero or non-finite length.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len.is_finite() && len > 0.0).then(|| Self::new(self.x / len, self.y / len, self.z / len))
    }

    /// `self` at `t = 0`, `rhs` at `t = 1`.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + t * (rhs.x - self.x),
            self.y + t * (rhs.y - self.y),
            self.z + t * (rhs.z - self.z),
        )
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AxisRange
// ─────────────────────────────────────────────────────────────────────────────

/// Closed sampling interval along one space dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Distance between two neighbouring grid samples for `resolution` cells.
    ///
    /// A zero resolution has no cells and therefore no step; `0.0` is returned
    /// so callers never divide by zero.
    #[must_use]
    pub fn step(self, resolution: usize) -> f64 {
        if resolution == 0 {
            0.0
        } else {
            self.span() / resolution as f64
        }
    }

    /// Coordinate of grid line `index` for the given resolution.
    #[must_use]
    pub fn at(self, index: usize, resolution: usize) -> f64 {
        self.min + index as f64 * self.step(resolution)
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

/// Axis-aligned sampling box for the implicit extractor.
pub type Bounds3 = [AxisRange; 3];

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Corner values closer than this are treated as equal when interpolating
    /// an edge crossing; the crossing is then placed at the edge midpoint.
    pub const CROSSING: Self = Self { eps: 1e-6 };

    /// `|a - b| < eps`; a difference of exactly `eps` is not equal.
    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.eps
    }
}
