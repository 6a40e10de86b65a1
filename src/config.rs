use std::path::Path;
use std::time::Duration;

use crate::{
    arc::config::ArcFixtureConfig,
    foundation::error::{MotionError, MotionResult},
    output::ARTNET_PORT,
};

/// Engine settings for one fixture session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Channel slots per frame.
    pub frame_size: usize,
    /// Linear fade update interval in milliseconds.
    pub rate_ms: u64,
    pub universe: u16,
    /// Arc fixture used when a request carries none.
    pub arc: ArcFixtureConfig,
    pub artnet: Option<ArtNetTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArtNetTarget {
    pub address: String,
    #[serde(default = "default_artnet_port")]
    pub port: u16,
}

fn default_artnet_port() -> u16 {
    ARTNET_PORT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_size: 512,
            rate_ms: 40,
            universe: 0,
            arc: ArcFixtureConfig::default(),
            artnet: None,
        }
    }
}

impl EngineConfig {
    pub fn rate(&self) -> Duration {
        Duration::from_millis(self.rate_ms)
    }

    pub fn validate(&self) -> MotionResult<()> {
        if self.frame_size == 0 {
            return Err(MotionError::validation("frame_size must be > 0"));
        }
        if self.rate_ms == 0 {
            return Err(MotionError::validation("rate_ms must be > 0"));
        }
        if self.universe > 0x7FFF {
            return Err(MotionError::validation("universe must fit in 15 bits"));
        }
        self.arc.validate()?;
        for ch in [self.arc.pan_channel, self.arc.tilt_channel] {
            if ch.index() >= self.frame_size {
                return Err(MotionError::validation(format!(
                    "arc channel {ch} is outside the {}-channel frame",
                    self.frame_size
                )));
            }
        }
        if let Some(target) = &self.artnet {
            if target.address.trim().is_empty() {
                return Err(MotionError::validation("artnet address must be non-empty"));
            }
            if target.port == 0 {
                return Err(MotionError::validation("artnet port must be > 0"));
            }
        }
        Ok(())
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| MotionError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .map_err(|e| MotionError::io(format!("open config '{}': {e}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(f))
    }
}
