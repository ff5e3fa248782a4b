//! Field sampling and meshing.
//!
//! Both evaluators share the same pipeline pieces: a [`FieldSampler`] that
//! turns evaluator faults into undefined samples, [`vertex_normals`] for
//! smooth shading and [`SurfaceData`] as the flat output record. Each returns
//! a [`FieldMeshDiagnostics`] describing what happened during the call.

mod cache;
mod color;
mod core;
mod diagnostics;
mod height_field;
pub mod marching_cubes;
mod metrics;
mod normals;
mod sampler;
mod surface_data;
mod triangulation;

pub use cache::{EdgeCacheStats, EdgeKey, EdgeVertexCache};
pub use color::{
    ColorMode, UNDEFINED_COLOR, ValueRange, domain_color, height_color, height_ratio,
    hsl_to_rgb, sample_color,
};
pub use core::{AxisRange, Bounds3, Tolerance, Vec3};
pub use diagnostics::{FieldMeshDiagnostics, count_edge_topology};
pub use height_field::{DEFAULT_HEIGHT_FIELD_RESOLUTION, HeightFieldOptions, evaluate_height_field};
pub use marching_cubes::{
    DEFAULT_ISOSURFACE_RESOLUTION, IsosurfaceOptions, UndefinedCornerPolicy, crossing_parameter,
    cube_index, extract_isosurface, interpolate_crossing,
};
pub use metrics::{FieldMetrics, FieldTimingReport, TimingBucket};
pub use normals::vertex_normals;
pub use sampler::{FieldSample, FieldSampler, GridSample, SampleMode};
pub use surface_data::SurfaceData;
pub use triangulation::quad_grid_indices;

#[cfg(test)]
mod tests;
