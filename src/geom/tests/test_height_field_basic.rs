use num_complex::Complex64;

use crate::expr::{Bindings, ComplexFnExpression, FnExpression, MevalExpression};
use crate::geom::{
    AxisRange, ColorMode, HeightFieldOptions, UNDEFINED_COLOR, evaluate_height_field,
};
use crate::space::{ComplexPlaneSpace, CylindricalSpace, SpaceKind};

fn unit_square(resolution: usize) -> HeightFieldOptions {
    HeightFieldOptions::default()
        .with_resolution(resolution)
        .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(-1.0, 1.0))
}

#[test]
fn sizes_hold_for_every_resolution() {
    let expr = MevalExpression::parse("sin(x) * cos(y)").expect("parse");
    for resolution in [1, 2, 7, 20] {
        let (surface, diagnostics) =
            evaluate_height_field(&expr, &SpaceKind::Cartesian, &unit_square(resolution));
        let side = resolution + 1;
        assert_eq!(surface.vertices.len(), 3 * side * side);
        assert_eq!(surface.normals.len(), surface.vertices.len());
        assert_eq!(surface.indices.len(), 6 * resolution * resolution);
        assert_eq!(diagnostics.triangle_count, 2 * resolution * resolution);
        surface.validate().expect("valid surface");
    }
}

#[test]
fn undefined_samples_become_black_placeholders() {
    // Hemisphere; undefined outside the unit disc.
    let field = FnExpression::new(|b: &Bindings<'_>| {
        let x = b.get("x").unwrap_or(0.0);
        let y = b.get("y").unwrap_or(0.0);
        (1.0 - x * x - y * y).sqrt()
    });
    let (surface, diagnostics) = evaluate_height_field(field, &SpaceKind::Cartesian, &unit_square(4));

    // Samples with x^2 + y^2 > 1: the four corners and their eight neighbours
    // on the boundary rows.
    assert_eq!(diagnostics.undefined_sample_count, 12);
    assert_eq!(diagnostics.placeholder_vertex_count, 12);
    assert_eq!(surface.vertex_count(), 25);
    assert_eq!(surface.indices.len(), 6 * 16);
    assert!(!surface.has_invalid_vertices());
    assert!(diagnostics.has_warnings());

    assert_eq!(surface.vertex(0), Some([0.0, 0.0, 0.0]));
    assert_eq!(surface.color(0), Some(UNDEFINED_COLOR.map(|c| c as f32)));
    assert_eq!(surface.vertex(24), Some([0.0, 0.0, 0.0]));
    // Centre sample sits on top of the dome.
    assert_eq!(surface.vertex(12), Some([0.0, 0.0, 1.0]));

    for index in [0, 1, 24] {
        assert_eq!(surface.normal(index), Some([0.0, 0.0, 0.0]), "vertex {index}");
    }
    // The dome top is flat, so its normal is vertical.
    let top = surface.normal(12).unwrap();
    assert!(top[2].abs() > 0.99, "{top:?}");
}

#[test]
fn height_colors_run_from_blue_at_min_to_red_at_max() {
    let field = FnExpression::new(|b: &Bindings<'_>| b.get("x").unwrap_or(0.0));
    let options = unit_square(2).with_color_mode(ColorMode::Height);
    let (surface, diagnostics) = evaluate_height_field(field, &SpaceKind::Cartesian, &options);
    assert_eq!(diagnostics.value_range, Some((-1.0, 1.0)));

    // Row 0 holds x = -1, the last row x = 1.
    let low = surface.color(0).unwrap();
    let high = surface.color(8).unwrap();
    assert!(low[2] > 0.99 && low[0] < 1e-6, "{low:?}");
    assert!(high[0] > 0.99 && high[2] < 1e-6, "{high:?}");
}

#[test]
fn tiny_value_range_still_spans_the_ramp() {
    let field = FnExpression::new(|b: &Bindings<'_>| 1e-16 * b.get("x").unwrap_or(0.0));
    let options = unit_square(2).with_color_mode(ColorMode::Height);
    let (surface, diagnostics) = evaluate_height_field(field, &SpaceKind::Cartesian, &options);
    assert_eq!(diagnostics.value_range, Some((-1e-16, 1e-16)));

    let low = surface.color(0).unwrap();
    let high = surface.color(8).unwrap();
    assert!(low[2] > 0.99 && low[0] < 1e-6 && low[1] < 1e-6, "{low:?}");
    assert!(high[0] > 0.99 && high[1] < 1e-6 && high[2] < 1e-6, "{high:?}");
}

#[test]
fn cylindrical_space_maps_through_polar_coordinates() {
    // A cone: height equals radius.
    let field = FnExpression::new(|b: &Bindings<'_>| b.get("r").unwrap_or(0.0));
    let options = HeightFieldOptions::default()
        .with_resolution(4)
        .with_bounds(
            AxisRange::new(0.0, 2.0),
            AxisRange::new(0.0, std::f64::consts::TAU),
        )
        .with_color_mode(ColorMode::None);
    let (surface, _) = evaluate_height_field(field, &CylindricalSpace, &options);

    for vertex in surface.positions() {
        let radial = f64::from(vertex[0]).hypot(f64::from(vertex[1]));
        assert!((radial - f64::from(vertex[2])).abs() < 1e-5, "{vertex:?}");
    }
    // i = 2 is r = 1, j = 1 is theta = pi / 2.
    let v = surface.vertex(2 * 5 + 1).unwrap();
    assert!(v[0].abs() < 1e-6 && (v[1] - 1.0).abs() < 1e-6 && (v[2] - 1.0).abs() < 1e-6);
}

#[test]
fn complex_plane_uses_magnitude_and_domain_colors() {
    let field = ComplexFnExpression::new(|z: Complex64| z * z);
    let options = HeightFieldOptions::default()
        .with_resolution(2)
        .with_bounds(AxisRange::new(-1.0, 1.0), AxisRange::new(-1.0, 1.0))
        .with_color_mode(ColorMode::Domain);
    let (surface, diagnostics) = evaluate_height_field(field, &ComplexPlaneSpace, &options);

    assert_eq!(diagnostics.undefined_sample_count, 0);
    // z = -1 - i: |z^2| = 2.
    assert_eq!(surface.vertex(0), Some([-1.0, -1.0, 2.0]));
    // z = -1: z^2 = 1, arg 0, hue 0.5 (cyan).
    let c = surface.color(1).unwrap();
    assert!(c[0] < 1e-6 && c[1] > 0.99 && c[2] > 0.99, "{c:?}");
}

#[test]
fn default_bounds_come_from_the_space() {
    let field = FnExpression::new(|_: &Bindings<'_>| 0.0);
    let options = HeightFieldOptions::default().with_resolution(1);
    let (surface, _) = evaluate_height_field(field, &SpaceKind::Cartesian, &options);
    assert_eq!(surface.vertex(0), Some([-5.0, -5.0, 0.0]));
    assert_eq!(surface.vertex(3), Some([5.0, 5.0, 0.0]));
}
