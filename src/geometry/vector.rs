use std::ops::{Add, Mul, Neg, Sub};

/// Cartesian point / vector in 3D.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Point3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Euclidean length.
pub fn vector_module(v: Point3) -> f64 {
    vector_scalar(v, v).sqrt()
}

/// Dot product.
pub fn vector_scalar(a: Point3, b: Point3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Cross product `a × b`.
pub fn vector_multiplication(a: Point3, b: Point3) -> Point3 {
    Point3::new(
        a.y * b.z - a.z * b.y,
        -(a.x * b.z - a.z * b.x),
        a.x * b.y - a.y * b.x,
    )
}

/// Scale `v` to unit length.
///
/// Precondition: `v` is not the zero vector. A zero input yields NaN components.
pub fn normalize_vector(v: Point3) -> Point3 {
    let m = vector_module(v);
    Point3::new(v.x / m, v.y / m, v.z / m)
}

/// Angle between two non-zero vectors, in `[0, π]`.
pub fn vectors_angle(a: Point3, b: Point3) -> f64 {
    let cos = vector_scalar(a, b) / (vector_module(a) * vector_module(b));
    cos.clamp(-1.0, 1.0).acos()
}

/// Distance between two points.
pub fn distance(a: Point3, b: Point3) -> f64 {
    vector_module(a - b)
}

/// `p + coef * offset`; `coef = -1` moves a point into a frame centered on `offset`.
pub fn translate(p: Point3, offset: Point3, coef: f64) -> Point3 {
    p + offset * coef
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/vector.rs"]
mod tests;
