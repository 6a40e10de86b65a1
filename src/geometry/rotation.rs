use crate::geometry::sphere::EPSILON;
use crate::geometry::vector::{Point3, normalize_vector, vector_multiplication, vectors_angle};
use std::f64::consts::PI;

/// Axis that arc circles are rotated onto.
pub const REFERENCE_AXIS: Point3 = Point3::new(0.0, 0.0, -1.0);

type Mat3 = [[f64; 3]; 3];

/// Rotation that takes an arbitrary axis onto [`REFERENCE_AXIS`], with its exact inverse.
///
/// Built from the unit quaternion that turns the reference axis onto the target axis (angle from
/// the dot product, rotation axis from the cross product). Applying the rotation multiplies by the
/// transposed matrix, so the target axis lands on the reference axis. When the two axes are
/// (anti)parallel within [`EPSILON`] the rotation axis is undefined and the rotation is the
/// identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRotation {
    m: Option<Mat3>,
}

impl AxisRotation {
    pub const IDENTITY: Self = Self { m: None };

    /// Rotation aligning `axis` with [`REFERENCE_AXIS`]. `axis` must be non-zero.
    pub fn aligning(axis: Point3) -> Self {
        let angle = vectors_angle(REFERENCE_AXIS, axis);
        let an = angle.rem_euclid(PI);
        if an < EPSILON || an > PI - EPSILON {
            return Self::IDENTITY;
        }

        let b = normalize_vector(vector_multiplication(REFERENCE_AXIS, axis));
        let (s, q0) = (angle / 2.0).sin_cos();
        let (q1, q2, q3) = (s * b.x, s * b.y, s * b.z);

        let m = [
            [
                q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
                2.0 * (q1 * q2 - q0 * q3),
                2.0 * (q1 * q3 + q0 * q2),
            ],
            [
                2.0 * (q1 * q2 + q0 * q3),
                q0 * q0 - q1 * q1 + q2 * q2 - q3 * q3,
                2.0 * (q2 * q3 - q0 * q1),
            ],
            [
                2.0 * (q1 * q3 - q0 * q2),
                2.0 * (q2 * q3 + q0 * q1),
                q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
            ],
        ];
        Self { m: Some(m) }
    }

    pub fn is_identity(&self) -> bool {
        self.m.is_none()
    }

    pub fn apply(&self, p: Point3) -> Point3 {
        let Some(m) = &self.m else {
            return p;
        };
        Point3::new(
            p.x * m[0][0] + p.y * m[1][0] + p.z * m[2][0],
            p.x * m[0][1] + p.y * m[1][1] + p.z * m[2][1],
            p.x * m[0][2] + p.y * m[1][2] + p.z * m[2][2],
        )
    }

    /// The inverse rotation (reference axis back onto the aligned axis).
    ///
    /// Equivalent to aligning the "back vector" `self.apply(REFERENCE_AXIS)`.
    pub fn inverse(&self) -> Self {
        let Some(m) = &self.m else {
            return *self;
        };
        let mut t = [[0.0; 3]; 3];
        for (i, row) in m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                t[j][i] = *v;
            }
        }
        Self { m: Some(t) }
    }
}

/// Rotate `point` by the rotation that aligns `target_axis` with [`REFERENCE_AXIS`].
pub fn rotate_point_around_axis(point: Point3, target_axis: Point3) -> Point3 {
    AxisRotation::aligning(target_axis).apply(point)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/rotation.rs"]
mod tests;
