/// Convenience result type used across arcmotion.
pub type MotionResult<T> = Result<T, MotionError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is non-fatal: the scheduler and channel store stay usable after a rejected
/// request.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// Malformed request payload or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Arc request missing a required orientation.
    #[error("invalid arc payload: {0}")]
    InvalidArcPayload(String),

    /// The supplied arc center is not equidistant from the start and end orientations.
    #[error(
        "invalid center point: radius to current {current_radius:.6} != radius to target {target_radius:.6}"
    )]
    InconsistentCenter {
        /// Radius from the solved circle center to the current orientation.
        current_radius: f64,
        /// Radius from the solved circle center to the target orientation.
        target_radius: f64,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// File or socket failures.
    #[error("io error: {0}")]
    Io(String),
}

impl MotionError {
    /// Build a [`MotionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotionError::InvalidArcPayload`] value.
    pub fn invalid_arc_payload(msg: impl Into<String>) -> Self {
        Self::InvalidArcPayload(msg.into())
    }

    /// Build a [`MotionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`MotionError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
