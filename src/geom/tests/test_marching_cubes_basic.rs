use crate::expr::{Bindings, FnExpression};
use crate::geom::{
    AxisRange, IsosurfaceOptions, SurfaceData, UndefinedCornerPolicy, extract_isosurface,
};

const RESOLUTION: usize = 15;

fn sphere_field() -> FnExpression<impl Fn(&Bindings<'_>) -> f64> {
    FnExpression::new(|b: &Bindings<'_>| {
        let x = b.get("x").unwrap_or(f64::NAN);
        let y = b.get("y").unwrap_or(f64::NAN);
        let z = b.get("z").unwrap_or(f64::NAN);
        x * x + y * y + z * z - 1.0
    })
}

fn sphere_options() -> IsosurfaceOptions {
    IsosurfaceOptions::default()
        .with_bounds([AxisRange::new(-2.0, 2.0); 3])
        .with_resolution(RESOLUTION)
}

fn length(v: [f32; 3]) -> f64 {
    let [x, y, z] = v.map(f64::from);
    (x * x + y * y + z * z).sqrt()
}

fn min_vertex_distance(surface: &SurfaceData) -> f64 {
    let positions: Vec<[f32; 3]> = surface.positions().collect();
    let mut min = f64::INFINITY;
    for (a, pa) in positions.iter().enumerate() {
        for pb in &positions[a + 1..] {
            let d = length([pa[0] - pb[0], pa[1] - pb[1], pa[2] - pb[2]]);
            min = min.min(d);
        }
    }
    min
}

#[test]
fn sphere_vertices_lie_near_unit_radius() {
    let (surface, _) = extract_isosurface(sphere_field(), &sphere_options());
    assert!(!surface.is_empty());
    surface.validate().expect("valid sphere mesh");

    let step = 4.0 / RESOLUTION as f64;
    for vertex in surface.positions() {
        let r = length(vertex);
        assert!((r - 1.0).abs() < step, "vertex {vertex:?} at radius {r}");
    }
}

#[test]
fn sphere_is_closed_and_manifold() {
    let (surface, diagnostics) = extract_isosurface(sphere_field(), &sphere_options());
    assert_eq!(diagnostics.open_edge_count, 0);
    assert_eq!(diagnostics.non_manifold_edge_count, 0);
    assert!(diagnostics.is_watertight());
    assert!(diagnostics.is_clean());

    // Euler characteristic of a sphere: V - E + F = 2 with E = 3F / 2.
    let v = surface.vertex_count() as i64;
    let f = surface.triangle_count() as i64;
    assert_eq!(2 * v - f, 4);
}

#[test]
fn sphere_shares_vertices_between_cubes() {
    let (surface, diagnostics) = extract_isosurface(sphere_field(), &sphere_options());
    assert!(diagnostics.active_cube_count > 0);
    assert!(surface.vertex_count() < 12 * diagnostics.active_cube_count);
    assert!(diagnostics.shared_vertex_count > 0);

    let step = 4.0 / RESOLUTION as f64;
    assert!(min_vertex_distance(&surface) > step * 0.01);
}

#[test]
fn sphere_normals_point_outward() {
    let (surface, _) = extract_isosurface(sphere_field(), &sphere_options());
    let mut outward = 0;
    for index in 0..surface.vertex_count() {
        let p = surface.vertex(index).unwrap();
        let n = surface.normal(index).unwrap();
        let dot = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
        if dot > 0.0 {
            outward += 1;
        }
    }
    assert!(outward * 10 >= surface.vertex_count() * 9);
}

#[test]
fn sphere_outside_bounds_is_empty() {
    let options = sphere_options().with_bounds([AxisRange::new(2.0, 3.0); 3]);
    let (surface, diagnostics) = extract_isosurface(sphere_field(), &options);
    assert!(surface.is_empty());
    assert_eq!(diagnostics.active_cube_count, 0);
}

#[test]
fn clipped_sphere_has_open_rim() {
    // Cutting the box at z = 0.1 leaves the lower cap open along its rim.
    let options = sphere_options().with_bounds([
        AxisRange::new(-2.0, 2.0),
        AxisRange::new(-2.0, 2.0),
        AxisRange::new(-2.0, 0.1),
    ]);
    let (surface, diagnostics) = extract_isosurface(sphere_field(), &options);
    assert!(!surface.is_empty());
    assert!(diagnostics.open_edge_count > 0);
    assert_eq!(diagnostics.non_manifold_edge_count, 0);
}

#[test]
fn undefined_region_is_reported_under_both_policies() {
    // Undefined for x > 1.5, leaving the sphere itself untouched.
    let extract = |policy| {
        let options = sphere_options().with_undefined_policy(policy);
        let expression = FnExpression::new(|b: &Bindings<'_>| {
            let x = b.get("x").unwrap_or(f64::NAN);
            if x > 1.5 {
                f64::NAN
            } else {
                let y = b.get("y").unwrap_or(f64::NAN);
                let z = b.get("z").unwrap_or(f64::NAN);
                x * x + y * y + z * z - 1.0
            }
        });
        extract_isosurface(expression, &options)
    };

    let (outside, outside_diag) = extract(UndefinedCornerPolicy::Outside);
    let (skipped, skipped_diag) = extract(UndefinedCornerPolicy::SkipCube);

    assert!(outside_diag.undefined_sample_count > 0);
    assert_eq!(
        outside_diag.indeterminate_cube_count,
        skipped_diag.indeterminate_cube_count
    );
    assert!(skipped_diag.indeterminate_cube_count > 0);
    // Treated as outside, the undefined slab borders positive samples and adds
    // no crossings; skipping those cubes changes nothing either.
    assert_eq!(outside.triangle_count(), skipped.triangle_count());
    assert!(!outside.has_invalid_vertices());
}
