//! Inbound request payloads and their validated, typed form.
//!
//! A [`Payload`] mirrors the loose JSON shape clients send. [`Payload::into_command`] checks it
//! once and produces a [`Command`] whose [`Request`] variant names exactly one kind of work.

use std::time::Duration;

use crate::{
    arc::config::{ArcFixtureConfig, FractionInterval, PanTilt},
    foundation::core::Channel,
    foundation::error::{MotionError, MotionResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionMode {
    Linear,
    Arc,
}

/// Raw `{channel, value}` pair as sent by clients.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawBucket {
    pub channel: i64,
    pub value: f64,
}

/// Loose inbound request. Every field is optional; [`Payload::into_command`] decides what it means.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Payload {
    pub channel: Option<i64>,
    pub value: Option<f64>,
    pub transition: Option<TransitionMode>,
    /// Milliseconds.
    pub duration: Option<u64>,
    pub buckets: Option<Vec<RawBucket>>,
    pub start_buckets: Option<Vec<RawBucket>>,
    pub universe: Option<u16>,
    /// Pan channel address of an arc request (`channel` is the tilt address).
    pub pan: Option<i64>,
    pub start: Option<PanTilt>,
    pub end: Option<PanTilt>,
    pub center: Option<PanTilt>,
    /// `[start, end]` fractions of the full arc.
    pub interval: Option<Vec<f64>>,
    pub arc: Option<ArcFixtureConfig>,
}

/// A validated immediate write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bucket {
    pub channel: Channel,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArcMotion {
    /// Defaults to the fixture's current pan/tilt when absent.
    pub start: Option<PanTilt>,
    pub end: PanTilt,
    pub center: PanTilt,
    pub duration: Duration,
    pub interval: FractionInterval,
    /// Overrides the session's default fixture.
    pub fixture: Option<ArcFixtureConfig>,
    pub pan_channel: Option<Channel>,
    pub tilt_channel: Option<Channel>,
}

impl ArcMotion {
    /// The fixture to drive, with any per-request channel overrides applied.
    pub fn resolve_fixture(&self, default: &ArcFixtureConfig) -> ArcFixtureConfig {
        let mut fixture = self.fixture.unwrap_or(*default);
        if let Some(ch) = self.pan_channel {
            fixture.pan_channel = ch;
        }
        if let Some(ch) = self.tilt_channel {
            fixture.tilt_channel = ch;
        }
        fixture
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Immediate(Bucket),
    LinearFade { channel: Channel, value: f64, duration: Duration },
    BatchWrite(Vec<Bucket>),
    BatchFade { buckets: Vec<Bucket>, duration: Duration },
    ArcMotion(ArcMotion),
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Immediate(_) => "immediate",
            Self::LinearFade { .. } => "linear_fade",
            Self::BatchWrite(_) => "batch_write",
            Self::BatchFade { .. } => "batch_fade",
            Self::ArcMotion(_) => "arc_motion",
        }
    }
}

/// A validated payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Command {
    pub universe: Option<u16>,
    /// Applied before `request`, with a single frame-send for the whole group.
    pub start_buckets: Vec<Bucket>,
    /// `None` when the payload only carried start buckets or addressed a non-positive channel.
    pub request: Option<Request>,
}

fn buckets(raw: &[RawBucket]) -> Vec<Bucket> {
    raw.iter()
        .filter_map(|b| {
            Channel::from_address(b.channel).map(|channel| Bucket {
                channel,
                value: b.value,
            })
        })
        .collect()
}

fn finite(name: &str, v: f64) -> MotionResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MotionError::validation(format!("{name} must be finite")))
    }
}

impl Payload {
    pub fn from_json(s: &str) -> MotionResult<Self> {
        serde_json::from_str(s).map_err(|e| MotionError::serde(format!("parse payload JSON: {e}")))
    }

    pub fn into_command(self) -> MotionResult<Command> {
        let start_buckets = buckets(self.start_buckets.as_deref().unwrap_or_default());
        for b in &start_buckets {
            finite("start bucket value", b.value)?;
        }
        if self.universe.is_some_and(|u| u > 0x7FFF) {
            return Err(MotionError::validation("universe must fit in 15 bits"));
        }
        let duration = Duration::from_millis(self.duration.unwrap_or(0));

        let request = if self.transition == Some(TransitionMode::Arc) {
            Some(self.arc_request(duration)?)
        } else if let Some(address) = self.channel {
            match Channel::from_address(address) {
                None => None,
                Some(channel) => {
                    let value = self.value.ok_or_else(|| {
                        MotionError::validation(format!("channel {address} has no value"))
                    })?;
                    let value = finite("value", value)?;
                    Some(match self.transition {
                        Some(_) => Request::LinearFade {
                            channel,
                            value,
                            duration,
                        },
                        None => Request::Immediate(Bucket { channel, value }),
                    })
                }
            }
        } else if let Some(raw) = &self.buckets {
            let list = buckets(raw);
            for b in &list {
                finite("bucket value", b.value)?;
            }
            Some(match self.transition {
                Some(_) => Request::BatchFade {
                    buckets: list,
                    duration,
                },
                None => Request::BatchWrite(list),
            })
        } else if self.start_buckets.is_some() {
            None
        } else {
            return Err(MotionError::validation(
                "payload needs a channel, buckets, or an arc transition",
            ));
        };

        Ok(Command {
            universe: self.universe,
            start_buckets,
            request,
        })
    }

    fn arc_request(&self, duration: Duration) -> MotionResult<Request> {
        let end = self
            .end
            .ok_or_else(|| MotionError::invalid_arc_payload("missing end orientation"))?;
        let center = self
            .center
            .ok_or_else(|| MotionError::invalid_arc_payload("missing center orientation"))?;
        let interval = match self.interval.as_deref() {
            None => FractionInterval::FULL,
            Some([from, to]) => FractionInterval::new(*from, *to)?,
            Some(other) => {
                return Err(MotionError::validation(format!(
                    "arc interval must have 2 entries, got {}",
                    other.len()
                )));
            }
        };
        if let Some(fixture) = &self.arc {
            fixture.validate()?;
        }
        Ok(Request::ArcMotion(ArcMotion {
            start: self.start,
            end,
            center,
            duration,
            interval,
            fixture: self.arc,
            pan_channel: self.pan.and_then(Channel::from_address),
            tilt_channel: self.channel.and_then(Channel::from_address),
        }))
    }
}

/// One scripted payload, delivered `at` milliseconds after the script starts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub at: u64,
    pub payload: Payload,
}

/// Parse a JSON array of [`ScriptStep`]s. Steps are returned sorted by `at` (stable).
pub fn parse_script<R: std::io::Read>(r: R) -> MotionResult<Vec<ScriptStep>> {
    let mut steps: Vec<ScriptStep> = serde_json::from_reader(r)
        .map_err(|e| MotionError::serde(format!("parse script JSON: {e}")))?;
    steps.sort_by_key(|s| s.at);
    Ok(steps)
}

#[cfg(test)]
#[path = "../tests/unit/request.rs"]
mod tests;
