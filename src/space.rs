//! Coordinate spaces a field can be sampled in.
//!
//! A space names its three dimensions and maps a coordinate tuple to a
//! renderable Cartesian point. Height fields bind the sampled value to the
//! third dimension; the implicit extractor samples all three.

use std::f64::consts::TAU;
use std::fmt;

use crate::geom::AxisRange;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpaceError {
    #[error("unknown coordinate space `{0}`")]
    Unknown(String),
}

pub trait MathSpace {
    fn name(&self) -> &'static str;

    /// Dimension names, used as expression variable names.
    fn dimensions(&self) -> [&'static str; 3];

    fn to_cartesian(&self, coordinates: [f64; 3]) -> [f64; 3];

    fn from_cartesian(&self, point: [f64; 3]) -> [f64; 3];

    #[must_use]
    fn default_bounds(&self) -> [AxisRange; 3];
}

/// Plain `(x, y, z)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartesianSpace;

impl MathSpace for CartesianSpace {
    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn dimensions(&self) -> [&'static str; 3] {
        ["x", "y", "z"]
    }

    fn to_cartesian(&self, coordinates: [f64; 3]) -> [f64; 3] {
        coordinates
    }

    fn from_cartesian(&self, point: [f64; 3]) -> [f64; 3] {
        point
    }

    fn default_bounds(&self) -> [AxisRange; 3] {
        [AxisRange::new(-5.0, 5.0); 3]
    }
}

/// Polar coordinates in the XY plane extruded along Z: `(r, theta, z)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CylindricalSpace;

impl MathSpace for CylindricalSpace {
    fn name(&self) -> &'static str {
        "cylindrical"
    }

    fn dimensions(&self) -> [&'static str; 3] {
        ["r", "theta", "z"]
    }

    fn to_cartesian(&self, [r, theta, z]: [f64; 3]) -> [f64; 3] {
        let (sin, cos) = theta.sin_cos();
        [r * cos, r * sin, z]
    }

    fn from_cartesian(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let r = x.hypot(y);
        let theta = y.atan2(x).rem_euclid(TAU);
        [r, theta, z]
    }

    fn default_bounds(&self) -> [AxisRange; 3] {
        [
            AxisRange::new(0.0, 5.0),
            AxisRange::new(0.0, TAU),
            AxisRange::new(-5.0, 5.0),
        ]
    }
}

/// The complex plane with the field magnitude as height: `(re, im, abs)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexPlaneSpace;

impl MathSpace for ComplexPlaneSpace {
    fn name(&self) -> &'static str {
        "complex"
    }

    fn dimensions(&self) -> [&'static str; 3] {
        ["re", "im", "abs"]
    }

    fn to_cartesian(&self, coordinates: [f64; 3]) -> [f64; 3] {
        coordinates
    }

    fn from_cartesian(&self, point: [f64; 3]) -> [f64; 3] {
        point
    }

    fn default_bounds(&self) -> [AxisRange; 3] {
        [
            AxisRange::new(-2.0, 2.0),
            AxisRange::new(-2.0, 2.0),
            AxisRange::new(0.0, 4.0),
        ]
    }
}

/// Registry of the built-in spaces, resolvable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpaceKind {
    #[default]
    Cartesian,
    Cylindrical,
    ComplexPlane,
}

impl SpaceKind {
    pub const ALL: [Self; 3] = [Self::Cartesian, Self::Cylindrical, Self::ComplexPlane];

    pub fn from_name(name: &str) -> Result<Self, SpaceError> {
        match normalize_name(name).as_str() {
            "cartesian" | "xyz" => Ok(Self::Cartesian),
            "cylindrical" | "polar" => Ok(Self::Cylindrical),
            "complex" | "complex-plane" | "complex_plane" => Ok(Self::ComplexPlane),
            _ => Err(SpaceError::Unknown(name.trim().to_owned())),
        }
    }

    fn space(self) -> &'static dyn MathSpace {
        match self {
            Self::Cartesian => &CartesianSpace,
            Self::Cylindrical => &CylindricalSpace,
            Self::ComplexPlane => &ComplexPlaneSpace,
        }
    }
}

impl MathSpace for SpaceKind {
    fn name(&self) -> &'static str {
        self.space().name()
    }

    fn dimensions(&self) -> [&'static str; 3] {
        self.space().dimensions()
    }

    fn to_cartesian(&self, coordinates: [f64; 3]) -> [f64; 3] {
        self.space().to_cartesian(coordinates)
    }

    fn from_cartesian(&self, point: [f64; 3]) -> [f64; 3] {
        self.space().from_cartesian(point)
    }

    fn default_bounds(&self) -> [AxisRange; 3] {
        self.space().default_bounds()
    }
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
