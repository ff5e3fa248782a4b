//! Implicit surface extraction with Marching Cubes.
//!
//! The `(R + 1)³` lattice is sampled once, every cube is classified by an
//! 8-bit corner mask and triangulated from the constant tables in
//! [`tables`]. Crossing vertices are shared between neighbouring cubes through
//! an [`EdgeVertexCache`](super::cache::EdgeVertexCache) scoped to one call.

mod extract;
pub mod tables;

use serde::{Deserialize, Serialize};

use super::core::Bounds3;

pub use extract::{crossing_parameter, cube_index, extract_isosurface, interpolate_crossing};

pub const DEFAULT_ISOSURFACE_RESOLUTION: usize = 32;

/// What a cube corner with an undefined sample counts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UndefinedCornerPolicy {
    /// The corner is outside the surface (its configuration bit stays clear).
    #[default]
    Outside,
    /// Any cube with an undefined corner emits nothing.
    SkipCube,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsosurfaceOptions {
    /// Sampling box in `x, y, z`. `None` uses the Cartesian space defaults.
    pub bounds: Option<Bounds3>,
    /// Cubes per axis.
    pub resolution: usize,
    pub isovalue: f64,
    pub undefined_policy: UndefinedCornerPolicy,
}

impl Default for IsosurfaceOptions {
    fn default() -> Self {
        Self {
            bounds: None,
            resolution: DEFAULT_ISOSURFACE_RESOLUTION,
            isovalue: 0.0,
            undefined_policy: UndefinedCornerPolicy::default(),
        }
    }
}

impl IsosurfaceOptions {
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds3) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_isovalue(mut self, isovalue: f64) -> Self {
        self.isovalue = isovalue;
        self
    }

    #[must_use]
    pub fn with_undefined_policy(mut self, policy: UndefinedCornerPolicy) -> Self {
        self.undefined_policy = policy;
        self
    }
}
