use std::time::{Duration, Instant};

use crate::{
    arc::config::PanTilt,
    arc::solver::ArcRequest,
    channel::store::ChannelStore,
    config::EngineConfig,
    foundation::core::Channel,
    foundation::error::{MotionError, MotionResult},
    output::FrameSender,
    request::{ArcMotion, Bucket, Command, Payload, Request, ScriptStep},
    transition::scheduler::{TransitionId, TransitionScheduler},
};

/// How script time maps onto wall time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackClock {
    /// Jump straight to each due time.
    Virtual,
    /// Sleep until each due time.
    Realtime,
}

/// Outcome of [`FixtureSession::play_script`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub accepted: usize,
    pub rejected: usize,
    pub ticks: usize,
}

/// One fixture: configuration, channel state, transitions and the frame sender they feed.
#[derive(Debug)]
pub struct FixtureSession<S: FrameSender> {
    config: EngineConfig,
    scheduler: TransitionScheduler,
    sender: S,
    universe: u16,
    origin: Instant,
}

impl<S: FrameSender> FixtureSession<S> {
    pub fn new(config: EngineConfig, sender: S) -> MotionResult<Self> {
        let store = ChannelStore::new(config.frame_size);
        Self::with_store(config, store, sender)
    }

    /// Start from a previously saved channel state.
    pub fn with_store(config: EngineConfig, mut store: ChannelStore, mut sender: S) -> MotionResult<Self> {
        config.validate()?;
        store.ensure_frame_size(config.frame_size);
        let scheduler = TransitionScheduler::new(store, config.rate())?;
        sender.set_universe(config.universe);
        Ok(Self {
            universe: config.universe,
            config,
            scheduler,
            sender,
            origin: Instant::now(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }

    pub fn value(&self, channel: Channel) -> u8 {
        self.scheduler.value(channel)
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Validate a raw payload and run it.
    pub fn dispatch(&mut self, payload: Payload) -> MotionResult<()> {
        let cmd = payload.into_command().inspect_err(|err| {
            tracing::warn!(%err, "rejected payload");
        })?;
        self.execute(cmd)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(request = cmd.request.as_ref().map(Request::kind)))]
    pub fn execute(&mut self, cmd: Command) -> MotionResult<()> {
        self.check_frame_bounds(&cmd)
            .inspect_err(|err| tracing::warn!(%err, "rejected command"))?;

        let universe = cmd.universe.unwrap_or(self.config.universe);
        if universe != self.universe {
            tracing::debug!(from = self.universe, to = universe, "switch universe");
            self.universe = universe;
            self.sender.set_universe(universe);
        }

        if !cmd.start_buckets.is_empty() {
            self.write_buckets(&cmd.start_buckets);
        }

        match cmd.request {
            None => Ok(()),
            Some(Request::Immediate(b)) => {
                self.scheduler.set_immediate(b.channel, b.value);
                self.sender.send(self.scheduler.store().as_slice());
                Ok(())
            }
            Some(Request::LinearFade {
                channel,
                value,
                duration,
            }) => {
                self.scheduler
                    .start_linear(channel, value, duration, &mut self.sender);
                Ok(())
            }
            Some(Request::BatchWrite(buckets)) => {
                self.write_buckets(&buckets);
                Ok(())
            }
            Some(Request::BatchFade { buckets, duration }) => {
                for b in &buckets {
                    self.scheduler.cancel(b.channel, true, &mut self.sender);
                    self.scheduler
                        .start_linear(b.channel, b.value, duration, &mut self.sender);
                }
                Ok(())
            }
            Some(Request::ArcMotion(motion)) => self.start_arc(&motion).map(|_| ()),
        }
    }

    /// Start an arc, reading the start orientation from the store when the request has none.
    pub fn start_arc(&mut self, motion: &ArcMotion) -> MotionResult<TransitionId> {
        let fixture = motion.resolve_fixture(&self.config.arc);
        let current = motion.start.unwrap_or_else(|| {
            PanTilt::new(
                f64::from(self.scheduler.value(fixture.pan_channel)),
                f64::from(self.scheduler.value(fixture.tilt_channel)),
            )
        });
        let req = ArcRequest {
            current,
            target: motion.end,
            center: motion.center,
            fixture,
            duration: motion.duration,
            update_interval: self.config.rate(),
            interval: motion.interval,
        };
        self.scheduler
            .start_arc(&req, &mut self.sender)
            .inspect_err(|err| tracing::warn!(%err, "rejected arc request"))
    }

    pub fn advance_to(&mut self, t: Duration) -> usize {
        self.scheduler.advance_to(t, &mut self.sender)
    }

    pub fn advance_by(&mut self, dt: Duration) -> usize {
        self.scheduler.advance_by(dt, &mut self.sender)
    }

    /// Fire every pending tick on the virtual clock.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.scheduler.next_due() {
            fired += self.advance_to(due);
        }
        fired
    }

    /// Fire every pending tick, sleeping until each one is due in wall time.
    pub fn run_until_idle_realtime(&mut self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.scheduler.next_due() {
            self.sleep_until(due);
            fired += self.advance_to(due);
        }
        fired
    }

    /// Deliver each step at its `at` offset, then drain the remaining ticks.
    ///
    /// Rejected payloads are counted and logged; they never stop playback.
    pub fn play_script(&mut self, steps: &[ScriptStep], clock: PlaybackClock) -> ScriptReport {
        let mut report = ScriptReport::default();
        for step in steps {
            let at = Duration::from_millis(step.at);
            if clock == PlaybackClock::Realtime {
                while let Some(due) = self.scheduler.next_due().filter(|d| *d <= at) {
                    self.sleep_until(due);
                    report.ticks += self.advance_to(due);
                }
                self.sleep_until(at);
            }
            report.ticks += self.advance_to(at);
            match self.dispatch(step.payload.clone()) {
                Ok(()) => report.accepted += 1,
                Err(_) => report.rejected += 1,
            }
        }
        report.ticks += match clock {
            PlaybackClock::Virtual => self.run_until_idle(),
            PlaybackClock::Realtime => self.run_until_idle_realtime(),
        };
        tracing::info!(
            accepted = report.accepted,
            rejected = report.rejected,
            ticks = report.ticks,
            "script finished"
        );
        report
    }

    /// Cancel everything, flush one final frame if anything was in flight, and hand back the
    /// channel state for persisting.
    pub fn shutdown(mut self) -> ChannelStore {
        let in_flight = self.scheduler.active_count();
        self.scheduler.cancel_all();
        if in_flight > 0 {
            self.sender.send(self.scheduler.store().as_slice());
        }
        tracing::debug!(in_flight, "session shut down");
        self.scheduler.into_store()
    }

    // The store grows to fit any write, so writes past the frame are refused up front.
    fn check_frame_bounds(&self, cmd: &Command) -> MotionResult<()> {
        let mut channels: Vec<Channel> = cmd.start_buckets.iter().map(|b| b.channel).collect();
        match &cmd.request {
            None => {}
            Some(Request::Immediate(b)) => channels.push(b.channel),
            Some(Request::LinearFade { channel, .. }) => channels.push(*channel),
            Some(Request::BatchWrite(buckets) | Request::BatchFade { buckets, .. }) => {
                channels.extend(buckets.iter().map(|b| b.channel));
            }
            Some(Request::ArcMotion(motion)) => {
                let fixture = motion.resolve_fixture(&self.config.arc);
                channels.extend([fixture.pan_channel, fixture.tilt_channel]);
            }
        }
        let frame_size = self.config.frame_size;
        match channels.into_iter().find(|ch| ch.index() >= frame_size) {
            Some(ch) => Err(MotionError::validation(format!(
                "channel {ch} is outside the {frame_size}-channel frame"
            ))),
            None => Ok(()),
        }
    }

    fn write_buckets(&mut self, buckets: &[Bucket]) {
        for b in buckets {
            self.scheduler.cancel(b.channel, true, &mut self.sender);
            self.scheduler.set_immediate(b.channel, b.value);
        }
        self.sender.send(self.scheduler.store().as_slice());
    }

    fn sleep_until(&self, t: Duration) {
        let deadline = self.origin + t;
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
