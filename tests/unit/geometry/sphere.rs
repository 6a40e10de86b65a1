use super::*;
use crate::foundation::core::round_channel_value;

#[test]
fn epsilon_matches_exp_minus_16() {
    assert!((EPSILON - (-16.0f64).exp()).abs() < 1e-20);
}

#[test]
fn degrees_wrap_into_one_turn() {
    assert!((degrees_to_radian(-90.0) - 270f64.to_radians()).abs() < 1e-12);
    assert!((degrees_to_radian(450.0) - 90f64.to_radians()).abs() < 1e-12);
    assert!((degrees_to_radian(-450.0) - 270f64.to_radians()).abs() < 1e-12);
    assert_eq!(degrees_to_radian(360.0), 0.0);
}

#[test]
fn poles_are_special_cased() {
    let north = to_spherical(Point3::new(0.0, 0.0, 10.0));
    assert_eq!((north.theta, north.phi), (0.0, 0.0));
    let south = to_spherical(Point3::new(0.0, 0.0, -10.0));
    assert_eq!((south.theta, south.phi), (PI, 0.0));
    let origin = to_spherical(Point3::ZERO);
    assert_eq!((origin.r, origin.theta, origin.phi), (0.0, 0.0, 0.0));
}

#[test]
fn to_cartesian_uses_fixed_radius_and_snaps_poles() {
    let p = to_cartesian(SphericalPoint::new(1.0, PI, 1.0));
    assert_eq!(p.x, 0.0);
    assert_eq!(p.y, 0.0);
    assert_eq!(p.z, -SPHERE_RADIUS);
}

#[test]
fn spherical_round_trip_in_hemisphere_range() {
    for (theta, phi) in [(0.3, 0.1), (1.2, 2.5), (2.9, 5.9), (PI / 2.0, PI)] {
        let back = to_spherical(to_cartesian(SphericalPoint::new(SPHERE_RADIUS, theta, phi)));
        assert!((back.r - SPHERE_RADIUS).abs() < 1e-6);
        assert!((back.theta - theta).abs() < 1e-6, "theta {theta} -> {}", back.theta);
        assert!((back.phi - phi).abs() < 1e-6, "phi {phi} -> {}", back.phi);
    }
}

#[test]
fn channel_scaling_round_trips_within_one_unit() {
    // 540 deg pan wraps after 170 units; 255 deg tilt never wraps.
    for v in 0..170u8 {
        let rad = channel_value_to_rad(f64::from(v), 540.0);
        let back = round_channel_value(rad_to_channel_value(rad, 540.0));
        assert!(back.abs_diff(v) <= 1, "pan {v} -> {back}");
    }
    for v in 0..=255u8 {
        let rad = channel_value_to_rad(f64::from(v), 255.0);
        let back = round_channel_value(rad_to_channel_value(rad, 255.0));
        assert!(back.abs_diff(v) <= 1, "tilt {v} -> {back}");
    }
}

#[test]
fn channel_pair_through_sphere_round_trips() {
    // tilt <= 180 deg keeps theta inside [0, pi]; pan < 360 deg keeps phi inside one turn.
    for (pan, tilt) in [(20u8, 40u8), (85, 90), (150, 170), (5, 179)] {
        let theta = channel_value_to_rad(f64::from(tilt), 255.0);
        let phi = channel_value_to_rad(f64::from(pan), 540.0);
        let s = to_spherical(to_cartesian(SphericalPoint::new(SPHERE_RADIUS, theta, phi)));
        let tilt_back = round_channel_value(rad_to_channel_value(s.theta, 255.0));
        let pan_back = round_channel_value(rad_to_channel_value(s.phi, 540.0));
        assert!(tilt_back.abs_diff(tilt) <= 1, "tilt {tilt} -> {tilt_back}");
        assert!(pan_back.abs_diff(pan) <= 1, "pan {pan} -> {pan_back}");
    }
}
