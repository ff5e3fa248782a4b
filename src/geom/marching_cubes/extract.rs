use log::{debug, warn};

use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use super::{IsosurfaceOptions, UndefinedCornerPolicy};
use crate::expr::Expression;
use crate::geom::cache::{EdgeKey, EdgeVertexCache};
use crate::geom::color::ValueRange;
use crate::geom::core::{AxisRange, Bounds3, Tolerance, Vec3};
use crate::geom::diagnostics::FieldMeshDiagnostics;
use crate::geom::metrics::{FieldMetrics, TimingBucket};
use crate::geom::normals::vertex_normals;
use crate::geom::sampler::{FieldSampler, SampleMode};
use crate::geom::surface_data::SurfaceData;
use crate::space::{CartesianSpace, MathSpace};

/// Configuration index of a cube: bit `c` is set iff corner `c` is finite and
/// strictly below `isovalue`.
#[must_use]
pub fn cube_index(corners: &[f64; 8], isovalue: f64) -> u8 {
    let mut index = 0u8;
    for (corner, value) in corners.iter().enumerate() {
        if value.is_finite() && *value < isovalue {
            index |= 1 << corner;
        }
    }
    index
}

/// Position of the isovalue crossing along an edge, in `[0, 1]` for a
/// genuine sign change.
///
/// Near-equal or non-finite endpoint values put the crossing at the midpoint.
#[must_use]
pub fn crossing_parameter(isovalue: f64, v1: f64, v2: f64) -> f64 {
    if !v1.is_finite() || !v2.is_finite() || Tolerance::CROSSING.approx_eq_f64(v1, v2) {
        return 0.5;
    }
    (isovalue - v1) / (v2 - v1)
}

#[must_use]
pub fn interpolate_crossing(
    isovalue: f64,
    p1: [f64; 3],
    p2: [f64; 3],
    v1: f64,
    v2: f64,
) -> [f64; 3] {
    let t = crossing_parameter(isovalue, v1, v2);
    Vec3::from(p1).lerp(Vec3::from(p2), t).into()
}

/// Field values on the `(R + 1)³` lattice; undefined samples are NaN.
struct Lattice {
    bounds: Bounds3,
    resolution: usize,
    values: Vec<f64>,
}

impl Lattice {
    fn side(&self) -> usize {
        self.resolution + 1
    }

    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        let side = self.side();
        self.values[(x * side + y) * side + z]
    }

    fn point(&self, x: usize, y: usize, z: usize) -> [f64; 3] {
        [
            self.bounds[0].at(x, self.resolution),
            self.bounds[1].at(y, self.resolution),
            self.bounds[2].at(z, self.resolution),
        ]
    }
}

fn sample_lattice<E: Expression>(
    sampler: &FieldSampler<'_, E>,
    bounds: Bounds3,
    resolution: usize,
) -> (Lattice, ValueRange) {
    let side = resolution + 1;
    let mut values = Vec::with_capacity(side * side * side);
    let mut range = ValueRange::empty();
    let [bx, by, bz]: [AxisRange; 3] = bounds;

    for x in 0..side {
        let px = bx.at(x, resolution);
        for y in 0..side {
            let py = by.at(y, resolution);
            for z in 0..side {
                let pz = bz.at(z, resolution);
                let value = sampler.sample_at(&[px, py, pz]).value_or_nan();
                range.include(value);
                values.push(value);
            }
        }
    }

    let lattice = Lattice {
        bounds,
        resolution,
        values,
    };
    (lattice, range)
}

/// Extracts the `options.isovalue` level set of `expression` over `x, y, z`.
///
/// Only plain numeric results are defined; anything else (including
/// evaluation faults) is handled by `options.undefined_policy`. A field with
/// no crossing in range, or a zero resolution, returns an empty surface.
#[allow(clippy::cast_possible_truncation, clippy::too_many_lines)]
pub fn extract_isosurface<E: Expression>(
    expression: E,
    options: &IsosurfaceOptions,
) -> (SurfaceData, FieldMeshDiagnostics) {
    let mut diagnostics = FieldMeshDiagnostics::new();
    let resolution = options.resolution;
    if resolution == 0 {
        diagnostics.add_warning("isosurface resolution is zero; nothing sampled");
        warn!("isosurface skipped: zero resolution");
        return (SurfaceData::empty(), diagnostics);
    }

    let mut metrics = FieldMetrics::default();
    metrics.begin();

    let space = CartesianSpace;
    let bounds = options.bounds.unwrap_or_else(|| space.default_bounds());
    let sampler = FieldSampler::new(expression, space.dimensions(), SampleMode::Strict);
    let iso = options.isovalue;

    let (lattice, range) = metrics.time(TimingBucket::Sampling, || {
        sample_lattice(&sampler, bounds, resolution)
    });

    let mut cache = EdgeVertexCache::new();
    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    metrics.time(TimingBucket::Extraction, || {
        let mut corners = [0.0f64; 8];
        for i in 0..resolution {
            for j in 0..resolution {
                for k in 0..resolution {
                    for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
                        corners[corner] = lattice.value(i + offset[0], j + offset[1], k + offset[2]);
                    }

                    if corners.iter().any(|value| !value.is_finite()) {
                        diagnostics.indeterminate_cube_count += 1;
                        if options.undefined_policy == UndefinedCornerPolicy::SkipCube {
                            continue;
                        }
                    }

                    let config = usize::from(cube_index(&corners, iso));
                    if config == 0 || config == 255 {
                        continue;
                    }
                    diagnostics.active_cube_count += 1;

                    let edge_mask = EDGE_TABLE[config];
                    let mut edge_vertices = [0u32; 12];
                    for (edge, [a, b]) in EDGE_CORNERS.iter().copied().enumerate() {
                        if edge_mask & (1 << edge) == 0 {
                            continue;
                        }
                        let key = EdgeKey::for_cube_edge(i, j, k, edge);
                        edge_vertices[edge] = cache.get_or_insert_with(key, || {
                            let (oa, ob) = (CORNER_OFFSETS[a], CORNER_OFFSETS[b]);
                            let p1 = lattice.point(i + oa[0], j + oa[1], k + oa[2]);
                            let p2 = lattice.point(i + ob[0], j + ob[1], k + ob[2]);
                            positions.push(interpolate_crossing(iso, p1, p2, corners[a], corners[b]));
                            (positions.len() - 1) as u32
                        });
                    }

                    // Table triangles face the inside; swap two corners so
                    // normals point toward increasing field values.
                    for tri in TRI_TABLE[config].chunks_exact(3) {
                        let [Ok(e0), Ok(e1), Ok(e2)] = [tri[0], tri[1], tri[2]].map(usize::try_from)
                        else {
                            break;
                        };
                        indices.extend_from_slice(&[
                            edge_vertices[e0],
                            edge_vertices[e2],
                            edge_vertices[e1],
                        ]);
                    }
                }
            }
        }
    });

    let normals = metrics.time(TimingBucket::Normals, || vertex_normals(&positions, &indices));
    metrics.time(TimingBucket::Diagnostics, || diagnostics.record_topology(&indices));

    let sample_count = lattice.values.len();
    diagnostics.sample_count = sample_count;
    diagnostics.undefined_sample_count = lattice.values.iter().filter(|v| !v.is_finite()).count();
    let cache_stats = cache.stats();
    diagnostics.shared_vertex_count = cache_stats.hits;
    diagnostics.value_range = range.bounds();

    if diagnostics.indeterminate_cube_count > 0 {
        let treatment = match options.undefined_policy {
            UndefinedCornerPolicy::Outside => "treated undefined corners as outside",
            UndefinedCornerPolicy::SkipCube => "skipped",
        };
        diagnostics.add_warning(format!(
            "{} cubes touch undefined samples ({treatment})",
            diagnostics.indeterminate_cube_count
        ));
        warn!(
            "isosurface: {} of {} samples undefined, {} indeterminate cubes",
            diagnostics.undefined_sample_count, sample_count, diagnostics.indeterminate_cube_count
        );
    }

    let surface = SurfaceData::from_parts(&positions, &normals, None, indices);
    diagnostics.vertex_count = surface.vertex_count();
    diagnostics.triangle_count = surface.triangle_count();
    diagnostics.timing = metrics.end();

    debug!(
        "isosurface at R={resolution}, iso={iso}: {} ({} cache entries, {:.0}% hits)",
        diagnostics.summary(),
        cache_stats.entries,
        cache_stats.hit_rate() * 100.0
    );

    (surface, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Bindings, FnExpression};

    fn cube(min: f64, max: f64) -> Bounds3 {
        [AxisRange::new(min, max); 3]
    }

    fn coord(b: &Bindings<'_>, name: &str) -> f64 {
        b.get(name).unwrap_or(f64::NAN)
    }

    #[test]
    fn cube_index_sets_bits_below_isovalue() {
        let corners = [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -0.5];
        assert_eq!(cube_index(&corners, 0.0), 0b1000_0001);
        assert_eq!(cube_index(&[0.0; 8], 0.0), 0);
        assert_eq!(cube_index(&[-1.0; 8], 0.0), 255);
    }

    #[test]
    fn non_finite_corner_is_never_inside() {
        let mut corners = [-1.0; 8];
        corners[3] = f64::NAN;
        corners[5] = f64::NEG_INFINITY;
        assert_eq!(cube_index(&corners, 0.0), 255 & !(1 << 3) & !(1 << 5));
    }

    #[test]
    fn crossing_interpolates_linearly() {
        assert!((crossing_parameter(0.0, -1.0, 3.0) - 0.25).abs() < 1e-12);
        let p = interpolate_crossing(0.0, [0.0, 0.0, 0.0], [2.0, 0.0, 0.0], -1.0, 3.0);
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_edge_uses_midpoint() {
        assert_eq!(crossing_parameter(0.0, 1e-7, 2e-7), 0.5);
        let p = interpolate_crossing(0.0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 3e-7, -3e-7);
        assert_eq!(p, [0.0, 0.0, 0.5]);
    }

    #[test]
    fn difference_of_exactly_the_tolerance_is_interpolated() {
        assert_eq!(crossing_parameter(0.0, 0.0, 1e-6), 0.0);
        assert_eq!(crossing_parameter(0.0, 0.0, 5e-7), 0.5);
    }

    #[test]
    fn non_finite_edge_uses_midpoint() {
        assert_eq!(crossing_parameter(0.0, f64::NAN, -1.0), 0.5);
        assert_eq!(crossing_parameter(0.0, 1.0, f64::INFINITY), 0.5);
    }

    #[test]
    fn constant_field_has_no_surface() {
        let options = IsosurfaceOptions::default()
            .with_bounds(cube(-1.0, 1.0))
            .with_resolution(6);
        let (surface, diagnostics) =
            extract_isosurface(FnExpression::new(|_: &Bindings<'_>| 1.0), &options);
        assert!(surface.is_empty());
        assert!(surface.vertices.is_empty());
        assert_eq!(diagnostics.sample_count, 343);
        assert_eq!(diagnostics.active_cube_count, 0);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn plane_is_one_sheet_with_shared_vertices() {
        // z = 0.3 crosses one layer of a 4x4x4 grid over [-1, 1]^3.
        let options = IsosurfaceOptions::default()
            .with_bounds(cube(-1.0, 1.0))
            .with_resolution(4);
        let field = FnExpression::new(|b: &Bindings<'_>| coord(b, "z") - 0.3);
        let (surface, diagnostics) = extract_isosurface(field, &options);

        assert_eq!(diagnostics.active_cube_count, 16);
        assert_eq!(surface.vertex_count(), 25);
        assert_eq!(surface.triangle_count(), 32);
        assert_eq!(diagnostics.open_edge_count, 16);
        assert_eq!(diagnostics.non_manifold_edge_count, 0);
        assert!(diagnostics.shared_vertex_count > 0);
        for vertex in surface.positions() {
            assert!((vertex[2] - 0.3).abs() < 1e-6, "{vertex:?}");
        }
        // Normals follow the gradient, which is +z.
        for index in 0..surface.vertex_count() {
            let normal = surface.normal(index).unwrap();
            assert!(normal[2] > 0.9, "{normal:?}");
        }
        surface.validate().expect("valid plane");
    }

    #[test]
    fn isovalue_shifts_the_level_set() {
        let options = IsosurfaceOptions::default()
            .with_bounds(cube(-1.0, 1.0))
            .with_resolution(4)
            .with_isovalue(-0.55);
        let field = FnExpression::new(|b: &Bindings<'_>| coord(b, "z"));
        let (surface, _) = extract_isosurface(field, &options);
        assert!(!surface.is_empty());
        for vertex in surface.positions() {
            assert!((vertex[2] + 0.55).abs() < 1e-6);
        }
    }

    #[test]
    fn singular_field_produces_finite_vertices() {
        let options = IsosurfaceOptions::default()
            .with_bounds(cube(-1.0, 1.0))
            .with_resolution(4)
            .with_isovalue(0.5);
        let field = FnExpression::new(|b: &Bindings<'_>| 1.0 / coord(b, "x"));
        let (surface, diagnostics) = extract_isosurface(field, &options);
        assert!(!surface.is_empty());
        assert!(!surface.has_invalid_vertices());
        assert!(surface.normals.iter().all(|n| n.is_finite()));
        // The x = 0 lattice plane is undefined.
        assert_eq!(diagnostics.undefined_sample_count, 25);
        assert_eq!(diagnostics.indeterminate_cube_count, 32);
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn skip_cube_policy_emits_nothing_for_indeterminate_cubes() {
        let options = IsosurfaceOptions::default()
            .with_bounds(cube(-1.0, 1.0))
            .with_resolution(4)
            .with_isovalue(0.5)
            .with_undefined_policy(UndefinedCornerPolicy::SkipCube);
        let field = FnExpression::new(|b: &Bindings<'_>| 1.0 / coord(b, "x"));
        let (surface, diagnostics) = extract_isosurface(field, &options);
        // Every crossing of 1/x = 0.5 in range sits next to the undefined plane.
        assert!(surface.is_empty());
        assert_eq!(diagnostics.indeterminate_cube_count, 32);
        assert_eq!(diagnostics.active_cube_count, 0);
    }

    #[test]
    fn zero_resolution_is_empty() {
        let options = IsosurfaceOptions::default().with_resolution(0);
        let field = FnExpression::new(|b: &Bindings<'_>| coord(b, "x"));
        let (surface, diagnostics) = extract_isosurface(field, &options);
        assert!(surface.is_empty());
        assert!(diagnostics.has_warnings());
    }
}
