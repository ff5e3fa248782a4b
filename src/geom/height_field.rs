//! Explicit height fields: one field value per point of a regular 2D grid.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::color::{ColorMode, ValueRange, sample_color};
use super::core::AxisRange;
use super::diagnostics::FieldMeshDiagnostics;
use super::metrics::{FieldMetrics, TimingBucket};
use super::normals::vertex_normals;
use super::sampler::{FieldSampler, GridSample, SampleMode};
use super::surface_data::SurfaceData;
use super::triangulation::quad_grid_indices;
use crate::expr::Expression;
use crate::space::MathSpace;

pub const DEFAULT_HEIGHT_FIELD_RESOLUTION: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeightFieldOptions {
    /// Cells per axis; the grid has `(resolution + 1)²` samples.
    pub resolution: usize,
    /// Ranges of the two input dimensions. `None` uses the space defaults.
    pub bounds: Option<[AxisRange; 2]>,
    pub color_mode: ColorMode,
}

impl Default for HeightFieldOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_HEIGHT_FIELD_RESOLUTION,
            bounds: None,
            color_mode: ColorMode::default(),
        }
    }
}

impl HeightFieldOptions {
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, u: AxisRange, v: AxisRange) -> Self {
        self.bounds = Some([u, v]);
        self
    }

    #[must_use]
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    fn resolved_bounds<S: MathSpace + ?Sized>(&self, space: &S) -> [AxisRange; 2] {
        self.bounds.unwrap_or_else(|| {
            let [u, v, _] = space.default_bounds();
            [u, v]
        })
    }
}

/// Samples `expression` over the first two dimensions of `space` and lifts each
/// sample into the third.
///
/// The vertex grid is always complete: undefined samples become placeholder
/// vertices at the origin (colored black, zero normal) so the index buffer
/// never changes shape. A zero resolution yields an empty surface.
pub fn evaluate_height_field<E, S>(
    expression: E,
    space: &S,
    options: &HeightFieldOptions,
) -> (SurfaceData, FieldMeshDiagnostics)
where
    E: Expression,
    S: MathSpace + ?Sized,
{
    let mut diagnostics = FieldMeshDiagnostics::new();
    let resolution = options.resolution;
    if resolution == 0 {
        diagnostics.add_warning("height field resolution is zero; nothing sampled");
        warn!("height field skipped: zero resolution");
        return (SurfaceData::empty(), diagnostics);
    }

    let mut metrics = FieldMetrics::default();
    metrics.begin();

    let [u_range, v_range] = options.resolved_bounds(space);
    let names = space.dimensions();
    let sampler = FieldSampler::new(expression, names, SampleMode::Lenient);

    let (samples, range) = metrics.time(TimingBucket::Sampling, || {
        sample_grid(&sampler, u_range, v_range, resolution)
    });

    let mut positions = Vec::with_capacity(samples.len());
    let mut placeholders = Vec::new();
    for (index, sample) in samples.iter().enumerate() {
        let [u, v, _] = sample.coordinates;
        let point = sample
            .sample
            .value()
            .map(|value| space.to_cartesian([u, v, value]))
            .filter(|point| point.iter().all(|c| c.is_finite()));
        match point {
            Some(point) => positions.push(point),
            None => {
                placeholders.push(index);
                positions.push([0.0, 0.0, 0.0]);
            }
        }
    }
    diagnostics.placeholder_vertex_count = placeholders.len();

    let indices = metrics.time(TimingBucket::Triangulation, || quad_grid_indices(resolution));
    let normals = metrics.time(TimingBucket::Normals, || {
        let mut normals = vertex_normals(&positions, &indices);
        // Placeholders are not part of the surface.
        for &index in &placeholders {
            normals[index] = [0.0, 0.0, 0.0];
        }
        normals
    });
    let colors = metrics.time(TimingBucket::Coloring, || {
        options.color_mode.has_colors().then(|| {
            samples
                .iter()
                .filter_map(|sample| sample_color(options.color_mode, &sample.sample, &range))
                .collect::<Vec<_>>()
        })
    });

    metrics.time(TimingBucket::Diagnostics, || diagnostics.record_topology(&indices));

    diagnostics.sample_count = samples.len();
    diagnostics.undefined_sample_count = samples.iter().filter(|s| !s.sample.is_defined()).count();
    diagnostics.value_range = range.bounds();
    if diagnostics.placeholder_vertex_count > 0 {
        diagnostics.add_warning(format!(
            "{} of {} samples undefined; placeholder vertices at the origin",
            diagnostics.placeholder_vertex_count, diagnostics.sample_count
        ));
        warn!(
            "height field over {}: {} placeholder vertices",
            space.name(),
            diagnostics.placeholder_vertex_count
        );
    }

    let surface = SurfaceData::from_parts(&positions, &normals, colors.as_deref(), indices);
    diagnostics.vertex_count = surface.vertex_count();
    diagnostics.triangle_count = surface.triangle_count();
    diagnostics.timing = metrics.end();

    debug!("height field over {} at R={resolution}: {}", space.name(), diagnostics.summary());

    (surface, diagnostics)
}

/// Row-major scan, first dimension outer, tracking the finite value range.
fn sample_grid<E: Expression>(
    sampler: &FieldSampler<'_, E>,
    u_range: AxisRange,
    v_range: AxisRange,
    resolution: usize,
) -> (Vec<GridSample>, ValueRange) {
    let side = resolution + 1;
    let mut samples = Vec::with_capacity(side * side);
    let mut range = ValueRange::empty();

    for i in 0..side {
        let u = u_range.at(i, resolution);
        for j in 0..side {
            let v = v_range.at(j, resolution);
            let sample = sampler.sample_at(&[u, v]);
            if let Some(value) = sample.value() {
                range.include(value);
            }
            samples.push(GridSample {
                coordinates: [u, v, sample.value_or_nan()],
                sample,
            });
        }
    }

    (samples, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Bindings, FnExpression};
    use crate::space::CartesianSpace;

    fn paraboloid() -> FnExpression<impl Fn(&Bindings<'_>) -> f64> {
        FnExpression::new(|b: &Bindings<'_>| {
            let x = b.get("x").unwrap_or(0.0);
            let y = b.get("y").unwrap_or(0.0);
            x * x + y * y
        })
    }

    #[test]
    fn grid_has_expected_sizes() {
        let options = HeightFieldOptions::default()
            .with_resolution(4)
            .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(-1.0, 1.0));
        let (surface, diagnostics) = evaluate_height_field(paraboloid(), &CartesianSpace, &options);
        assert_eq!(surface.vertices.len(), 3 * 25);
        assert_eq!(surface.normals.len(), 3 * 25);
        assert_eq!(surface.indices.len(), 6 * 16);
        assert_eq!(surface.colors.as_ref().map(Vec::len), Some(3 * 25));
        assert_eq!(diagnostics.sample_count, 25);
        assert_eq!(diagnostics.value_range, Some((0.0, 2.0)));
        assert_eq!(diagnostics.open_edge_count, 16);
        surface.validate().expect("valid height field");
    }

    #[test]
    fn first_sample_is_the_lower_corner() {
        let options = HeightFieldOptions::default()
            .with_resolution(2)
            .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(0.0, 2.0));
        let (surface, _) = evaluate_height_field(paraboloid(), &CartesianSpace, &options);
        assert_eq!(surface.vertex(0), Some([-1.0, 0.0, 1.0]));
        // j is the inner index
        assert_eq!(surface.vertex(1), Some([-1.0, 1.0, 2.0]));
        assert_eq!(surface.vertex(3), Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn zero_resolution_is_empty() {
        let options = HeightFieldOptions::default().with_resolution(0);
        let (surface, diagnostics) = evaluate_height_field(paraboloid(), &CartesianSpace, &options);
        assert!(surface.is_empty());
        assert!(surface.vertices.is_empty());
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn no_color_mode_omits_buffer() {
        let options = HeightFieldOptions::default()
            .with_resolution(3)
            .with_color_mode(ColorMode::None);
        let (surface, _) = evaluate_height_field(paraboloid(), &CartesianSpace, &options);
        assert!(surface.colors.is_none());
    }
}
