use super::*;
use crate::geometry::vector::{distance, vector_module};

fn near(a: Point3, b: Point3) -> bool {
    distance(a, b) < 1e-9
}

#[test]
fn aligns_axis_with_reference() {
    let n = normalize_vector(Point3::new(0.3, -0.5, 0.8));
    let rot = AxisRotation::aligning(n);
    assert!(!rot.is_identity());
    assert!(near(rot.apply(n), REFERENCE_AXIS));
}

#[test]
fn inverse_undoes_rotation() {
    let rot = AxisRotation::aligning(Point3::new(-2.0, 1.0, 0.5));
    let q = Point3::new(1.2, -3.4, 2.2);
    assert!(near(rot.inverse().apply(rot.apply(q)), q));
    assert!(near(rot.apply(rot.inverse().apply(q)), q));
}

#[test]
fn inverse_matches_back_vector_rotation() {
    let n = Point3::new(0.3, -0.5, 0.8);
    let back = rotate_point_around_axis(REFERENCE_AXIS, n);
    let q = Point3::new(1.2, -3.4, 2.2);
    let forward = rotate_point_around_axis(q, n);
    assert!(near(
        rotate_point_around_axis(forward, back),
        AxisRotation::aligning(n).inverse().apply(forward)
    ));
    assert!(near(rotate_point_around_axis(forward, back), q));
}

#[test]
fn rotation_preserves_length() {
    let rot = AxisRotation::aligning(Point3::new(1.0, 1.0, 1.0));
    let q = Point3::new(4.0, -1.0, 7.5);
    assert!((vector_module(rot.apply(q)) - vector_module(q)).abs() < 1e-9);
}

#[test]
fn parallel_axes_short_circuit_to_identity() {
    let q = Point3::new(1.0, 2.0, 3.0);
    for axis in [Point3::new(0.0, 0.0, -4.0), Point3::new(0.0, 0.0, 2.0)] {
        let rot = AxisRotation::aligning(axis);
        assert!(rot.is_identity());
        assert_eq!(rot.apply(q), q);
        assert_eq!(rot.inverse().apply(q), q);
        assert_eq!(rotate_point_around_axis(q, axis), q);
    }
}
