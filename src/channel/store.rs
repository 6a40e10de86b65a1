use crate::foundation::core::{Channel, round_channel_value};
use crate::foundation::error::{MotionError, MotionResult};
use std::path::Path;

/// Flat array of current channel values.
///
/// Addressed externally by 1-based [`Channel`]; slot `channel - 1` internally. Unset slots read as
/// 0 and the array grows when a write lands past its end, up to 65535 slots. Every send passes the
/// whole array, so [`crate::FixtureSession`] refuses writes outside its configured frame size.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChannelStore {
    values: Vec<u8>,
}

impl ChannelStore {
    /// A zeroed store holding `frame_size` slots.
    pub fn new(frame_size: usize) -> Self {
        Self {
            values: vec![0; frame_size],
        }
    }

    /// Grow (never shrink) to hold at least `frame_size` slots.
    pub fn ensure_frame_size(&mut self, frame_size: usize) {
        if self.values.len() < frame_size {
            self.values.resize(frame_size, 0);
        }
    }

    pub fn get(&self, channel: Channel) -> u8 {
        self.values.get(channel.index()).copied().unwrap_or(0)
    }

    pub fn set(&mut self, channel: Channel, value: u8) {
        let idx = channel.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, 0);
        }
        self.values[idx] = value;
    }

    /// Round and clamp `value`, then store it.
    pub fn set_rounded(&mut self, channel: Channel, value: f64) {
        self.set(channel, round_channel_value(value));
    }

    /// The full frame, slot 0 first.
    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MotionError::serde(format!("parse channel state JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            MotionError::io(format!("open channel state '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> MotionResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec(self)
            .map_err(|e| MotionError::serde(format!("serialize channel state: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            MotionError::io(format!("write channel state '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/store.rs"]
mod tests;
