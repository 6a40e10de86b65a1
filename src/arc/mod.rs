//! Great-circle pan/tilt motion between two orientations.

pub(crate) mod config;
pub(crate) mod solver;
