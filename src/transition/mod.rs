//! Per-channel transition scheduling over a virtual clock.

pub(crate) mod linear;
pub(crate) mod scheduler;
pub(crate) mod timer;
