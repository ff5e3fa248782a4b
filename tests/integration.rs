use field_engine::Engine;
use field_engine::geom::{
    AxisRange, ColorMode, HeightFieldOptions, IsosurfaceOptions, SurfaceData, height_ratio,
    interpolate_crossing,
};

fn assert_buffers_consistent(surface: &SurfaceData) {
    assert_eq!(surface.vertices.len(), surface.normals.len());
    assert_eq!(surface.vertices.len() % 3, 0);
    assert_eq!(surface.indices.len() % 3, 0);
    let vertex_count = surface.vertices.len() / 3;
    assert!(surface.indices.iter().all(|&i| (i as usize) < vertex_count));
}

fn sphere_options() -> IsosurfaceOptions {
    IsosurfaceOptions::default()
        .with_bounds([AxisRange::new(-2.0, 2.0); 3])
        .with_resolution(15)
}

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(engine.is_initialized());
    assert!(engine.last_diagnostics().is_none());
}

#[test]
fn height_field_buffer_sizes_follow_resolution() {
    let mut engine = Engine::new();
    for resolution in [1, 5, 12] {
        let options = HeightFieldOptions::default().with_resolution(resolution);
        let surface = engine
            .build_height_field("sin(x) * cos(y)", "cartesian", &options)
            .expect("height field");
        assert_buffers_consistent(&surface);
        let side = resolution + 1;
        assert_eq!(surface.vertices.len(), 3 * side * side);
        assert_eq!(surface.indices.len(), 6 * resolution * resolution);
    }
}

#[test]
fn height_field_survives_undefined_samples() {
    let mut engine = Engine::new();
    let options = HeightFieldOptions::default()
        .with_resolution(8)
        .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(-1.0, 1.0));
    let surface = engine
        .build_height_field("sqrt(x) + ln(y)", "cartesian", &options)
        .expect("height field");
    assert_buffers_consistent(&surface);
    assert!(!surface.has_invalid_vertices());

    let diagnostics = engine.last_diagnostics().expect("diagnostics");
    assert!(diagnostics.undefined_sample_count > 0);
    assert_eq!(
        diagnostics.placeholder_vertex_count,
        diagnostics.undefined_sample_count
    );
}

#[test]
fn height_colors_span_the_value_range() {
    let mut engine = Engine::new();
    let options = HeightFieldOptions::default()
        .with_resolution(2)
        .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(-1.0, 1.0))
        .with_color_mode(ColorMode::Height);
    let surface = engine
        .build_height_field("x", "cartesian", &options)
        .expect("height field");

    assert_eq!(height_ratio(-1.0, -1.0, 1.0), 0.0);
    assert_eq!(height_ratio(1.0, -1.0, 1.0), 1.0);

    // Minimum sample is pure blue, maximum pure red.
    let low = surface.color(0).expect("color");
    let high = surface.color(8).expect("color");
    assert!(low[2] > 0.99 && low[0] < 1e-6 && low[1] < 1e-6, "{low:?}");
    assert!(high[0] > 0.99 && high[1] < 1e-6 && high[2] < 1e-6, "{high:?}");
}

#[test]
fn constant_field_above_isovalue_is_empty() {
    let mut engine = Engine::new();
    let surface = engine
        .build_isosurface("1", &sphere_options())
        .expect("isosurface");
    assert!(surface.indices.is_empty());
    assert!(surface.vertices.is_empty());
}

#[test]
fn sphere_vertices_lie_within_one_step_of_radius() {
    let mut engine = Engine::new();
    let surface = engine
        .build_isosurface("x^2 + y^2 + z^2 - 1", &sphere_options())
        .expect("isosurface");
    assert!(!surface.indices.is_empty());
    assert_buffers_consistent(&surface);

    let step = 4.0 / 15.0;
    for vertex in surface.positions() {
        let [x, y, z] = vertex.map(f64::from);
        let r = (x * x + y * y + z * z).sqrt();
        assert!((r - 1.0).abs() < step, "{vertex:?}");
    }
}

#[test]
fn sphere_vertices_are_shared_between_cubes() {
    let mut engine = Engine::new();
    let surface = engine
        .build_isosurface("x^2 + y^2 + z^2 = 1", &sphere_options())
        .expect("isosurface");
    let diagnostics = engine.last_diagnostics().expect("diagnostics");
    assert!(surface.vertex_count() < 12 * diagnostics.active_cube_count);

    // Neighbouring cubes must stitch onto the same vertex rather than a
    // near-coincident copy.
    let positions: Vec<[f32; 3]> = surface.positions().collect();
    for (a, pa) in positions.iter().enumerate() {
        for pb in &positions[a + 1..] {
            let d = (0..3)
                .map(|axis| f64::from(pa[axis] - pb[axis]).powi(2))
                .sum::<f64>()
                .sqrt();
            assert!(d > 1e-4, "duplicate vertex near {pa:?}");
        }
    }
    assert_eq!(diagnostics.open_edge_count, 0);
}

#[test]
fn sphere_normals_face_away_from_origin() {
    let mut engine = Engine::new();
    let surface = engine
        .build_isosurface("x^2 + y^2 + z^2 - 1", &sphere_options())
        .expect("isosurface");

    let mut outward = 0usize;
    for index in 0..surface.vertex_count() {
        let p = surface.vertex(index).expect("vertex");
        let n = surface.normal(index).expect("normal");
        if p[0] * n[0] + p[1] * n[1] + p[2] * n[2] > 0.0 {
            outward += 1;
        }
    }
    assert!(outward * 10 >= surface.vertex_count() * 9);
}

#[test]
fn near_equal_crossing_values_use_the_edge_midpoint() {
    let p = interpolate_crossing(0.0, [0.0, 0.0, 0.0], [1.0, 2.0, 0.0], 0.0, 5e-7);
    assert_eq!(p, [0.5, 1.0, 0.0]);
}

#[test]
fn singular_field_keeps_finite_geometry() {
    let mut engine = Engine::new();
    let options = IsosurfaceOptions::default()
        .with_bounds([AxisRange::new(-1.0, 1.0); 3])
        .with_resolution(4)
        .with_isovalue(0.5);
    let surface = engine
        .build_isosurface("1 / x", &options)
        .expect("isosurface");
    assert_buffers_consistent(&surface);
    assert!(!surface.has_invalid_vertices());

    let diagnostics = engine.last_diagnostics().expect("diagnostics");
    assert!(diagnostics.indeterminate_cube_count > 0);
    assert!(diagnostics.has_warnings());
}
