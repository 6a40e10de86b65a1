use crate::foundation::core::MAX_CHANNEL_VALUE;
use crate::geometry::vector::Point3;
use std::f64::consts::{PI, TAU};

/// Comparison tolerance for the arc geometry, `e^-16`.
pub const EPSILON: f64 = 1.125_351_747_192_591_2e-7;

/// Radius of the sphere used for the Cartesian intermediate representation.
pub const SPHERE_RADIUS: f64 = 10.0;

/// Orientation on a sphere.
///
/// `theta` is the polar angle (colatitude) in `[0, π]`, `phi` the azimuth in `[0, 2π)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SphericalPoint {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

impl SphericalPoint {
    pub fn new(r: f64, theta: f64, phi: f64) -> Self {
        Self { r, theta, phi }
    }
}

// Trig results are snapped to 10 decimals so that poles and quarter turns land exactly on 0/±1.
fn snap(v: f64) -> f64 {
    (v * 1e10).round() / 1e10
}

/// Spherical to Cartesian on a sphere of [`SPHERE_RADIUS`]; the input radius is ignored.
pub fn to_cartesian(p: SphericalPoint) -> Point3 {
    let r = SPHERE_RADIUS;
    let sin_theta = snap(p.theta.sin());
    Point3::new(
        r * sin_theta * snap(p.phi.cos()),
        r * sin_theta * snap(p.phi.sin()),
        r * snap(p.theta.cos()),
    )
}

/// Cartesian to spherical.
///
/// Points on the z axis have an undefined azimuth; they map to `theta = 0` (z ≥ 0) or `π` and
/// `phi = 0`.
pub fn to_spherical(p: Point3) -> SphericalPoint {
    let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
    if p.x == 0.0 && p.y == 0.0 {
        let theta = if p.z >= 0.0 { 0.0 } else { PI };
        return SphericalPoint::new(r, theta, 0.0);
    }
    let theta = (p.z / r).clamp(-1.0, 1.0).acos();
    let phi = p.y.atan2(p.x).rem_euclid(TAU);
    SphericalPoint::new(r, theta, phi)
}

/// Degrees to radians after wrapping into `[0, 360)`.
pub fn degrees_to_radian(v: f64) -> f64 {
    v.rem_euclid(360.0).to_radians()
}

pub fn radians_to_degrees(v: f64) -> f64 {
    v.to_degrees()
}

/// Map a `[0, 255]` channel value onto a `max_angle_deg` sweep, in radians.
pub fn channel_value_to_rad(value: f64, max_angle_deg: f64) -> f64 {
    degrees_to_radian(value * max_angle_deg / f64::from(MAX_CHANNEL_VALUE))
}

/// Inverse of [`channel_value_to_rad`] (unclamped, unrounded).
pub fn rad_to_channel_value(rad: f64, max_angle_deg: f64) -> f64 {
    radians_to_degrees(rad) * f64::from(MAX_CHANNEL_VALUE) / max_angle_deg
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sphere.rs"]
mod tests;
