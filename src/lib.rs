//! arcmotion drives pan/tilt moving heads over a DMX-style channel frame.
//!
//! The engine turns requests into deterministic sequences of timed channel writes:
//!
//! - Linear fades on any channel
//! - Great-circle arc motions that move pan and tilt jointly around a chosen center orientation
//! - Immediate single and batch writes
//!
//! A [`FixtureSession`] owns the channel state, the [`TransitionScheduler`] and a [`FrameSender`]
//! that receives the full frame after every visible batch of writes.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod arc;
pub(crate) mod channel;
/// Engine configuration.
pub mod config;
/// Pure geometry used by the arc solver.
pub mod geometry;
/// Frame senders.
pub mod output;
/// Request payloads and validation.
pub mod request;
/// Fixture session API.
pub mod session;
pub(crate) mod transition;

pub use crate::foundation::core::{
    Channel, ChannelWrite, MAX_CHANNEL_VALUE, MIN_CHANNEL_VALUE, round_channel_value,
    validate_channel_value,
};
pub use crate::foundation::error::{MotionError, MotionResult};

pub use crate::arc::config::{ArcFixtureConfig, FractionInterval, PanTilt};
pub use crate::arc::solver::{
    ArcPath, ArcRequest, ArcSample, ArcSamples, MAX_ARC_STEPS, calc_center_point, shortest_angle_delta,
    solve_arc,
};
pub use crate::channel::store::ChannelStore;
pub use crate::config::{ArtNetTarget, EngineConfig};
pub use crate::output::{
    ArtNetSender, CountingSender, FrameSender, NullSender, RecordingSender, SentFrame,
};
pub use crate::request::{
    ArcMotion, Bucket, Command, Payload, RawBucket, Request, ScriptStep, TransitionMode,
    parse_script,
};
pub use crate::session::{FixtureSession, PlaybackClock, ScriptReport};
pub use crate::transition::linear::{FadeStep, plan_linear_fade};
pub use crate::transition::scheduler::{
    ActiveTransition, TransitionId, TransitionKind, TransitionScheduler,
};
pub use crate::transition::timer::{Fired, TimerHandle, TimerQueue};
