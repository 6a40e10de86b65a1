use crate::foundation::core::Channel;
use crate::foundation::error::{MotionError, MotionResult};

/// Pan/tilt channel layout and mechanical sweep of a moving head.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArcFixtureConfig {
    pub pan_channel: Channel,
    pub tilt_channel: Channel,
    /// Full pan sweep in degrees (channel 0..=255 maps onto 0..=pan_angle).
    pub pan_angle: f64,
    /// Full tilt sweep in degrees.
    pub tilt_angle: f64,
}

impl Default for ArcFixtureConfig {
    fn default() -> Self {
        Self {
            pan_channel: Channel::at(1),
            tilt_channel: Channel::at(3),
            pan_angle: 540.0,
            tilt_angle: 255.0,
        }
    }
}

impl ArcFixtureConfig {
    pub fn validate(&self) -> MotionResult<()> {
        if self.pan_channel == self.tilt_channel {
            return Err(MotionError::validation(
                "arc pan_channel and tilt_channel must differ",
            ));
        }
        if !(self.pan_angle.is_finite() && self.pan_angle > 0.0) {
            return Err(MotionError::validation("arc pan_angle must be > 0"));
        }
        if !(self.tilt_angle.is_finite() && self.tilt_angle > 0.0) {
            return Err(MotionError::validation("arc tilt_angle must be > 0"));
        }
        Ok(())
    }
}

/// Orientation in raw channel-value units.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanTilt {
    pub pan: f64,
    pub tilt: f64,
}

impl PanTilt {
    pub fn new(pan: f64, tilt: f64) -> Self {
        Self { pan, tilt }
    }
}

/// Sub-range `[start, end] ⊆ [0, 1]` of a transition to generate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractionInterval {
    start: f64,
    end: f64,
}

impl Default for FractionInterval {
    fn default() -> Self {
        Self::FULL
    }
}

impl FractionInterval {
    pub const FULL: Self = Self {
        start: 0.0,
        end: 1.0,
    };

    pub fn new(start: f64, end: f64) -> MotionResult<Self> {
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) {
            return Err(MotionError::validation(format!(
                "interval bounds must lie in [0, 1], got [{start}, {end}]"
            )));
        }
        if start > end {
            return Err(MotionError::validation(format!(
                "interval start must be <= end, got [{start}, {end}]"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(self) -> f64 {
        self.start
    }

    pub fn end(self) -> f64 {
        self.end
    }

    pub fn span(self) -> f64 {
        self.end - self.start
    }
}
