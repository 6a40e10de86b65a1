//! Stateless vector, sphere and rotation helpers for the arc solver.

pub mod rotation;
pub mod sphere;
pub mod vector;
