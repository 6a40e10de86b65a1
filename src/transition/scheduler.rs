use crate::arc::solver::{ArcRequest, solve_arc};
use crate::channel::store::ChannelStore;
use crate::foundation::core::{Channel, ChannelWrite, round_channel_value};
use crate::foundation::error::{MotionError, MotionResult};
use crate::output::FrameSender;
use crate::transition::linear::plan_linear_fade;
use crate::transition::timer::{TimerHandle, TimerQueue};
use smallvec::{SmallVec, smallvec};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Identifier of an accepted transition. Never reused within a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Linear,
    Arc,
}

type Writes = SmallVec<[ChannelWrite; 2]>;

// One precomputed timed write. `completes` marks the tick that retires its transition.
#[derive(Clone, Debug)]
struct Tick {
    writes: Writes,
    completes: Option<TransitionId>,
}

#[derive(Debug)]
struct Transition {
    kind: TransitionKind,
    channels: SmallVec<[Channel; 2]>,
    target_value: Option<u8>,
    pending: Vec<TimerHandle>,
    finalize: Writes,
}

/// Read-only view of an active transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveTransition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub target_value: Option<u8>,
}

/// Owns the channel store and every in-flight transition.
///
/// At most one transition is active per channel. An arc owns its pan and tilt channels jointly, so
/// cancelling either one cancels both. Ticks are precomputed and queued up front on a virtual
/// clock; [`TransitionScheduler::advance_to`] fires the ones that are due.
#[derive(Debug)]
pub struct TransitionScheduler {
    store: ChannelStore,
    rate: Duration,
    timers: TimerQueue<Tick>,
    transitions: HashMap<TransitionId, Transition>,
    by_channel: BTreeMap<Channel, TransitionId>,
    next_id: u64,
}

impl TransitionScheduler {
    /// `rate` is the linear fade update interval and must be non-zero.
    pub fn new(store: ChannelStore, rate: Duration) -> MotionResult<Self> {
        if rate.is_zero() {
            return Err(MotionError::validation("transition rate must be > 0"));
        }
        Ok(Self {
            store,
            rate,
            timers: TimerQueue::new(),
            transitions: HashMap::new(),
            by_channel: BTreeMap::new(),
            next_id: 0,
        })
    }

    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    /// Current value of `channel` in the store.
    pub fn value(&self, channel: Channel) -> u8 {
        self.store.get(channel)
    }

    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Virtual time of the last fired tick or clock advance.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// No ticks are pending.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn pending_ticks(&self) -> usize {
        self.timers.len()
    }

    pub fn active_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn active(&self, channel: Channel) -> Option<ActiveTransition> {
        let id = *self.by_channel.get(&channel)?;
        let t = self.transitions.get(&id)?;
        Some(ActiveTransition {
            id,
            kind: t.kind,
            target_value: t.target_value,
        })
    }

    /// Write `value` straight to the store. Active transitions are left alone and no frame is sent.
    pub fn set_immediate(&mut self, channel: Channel, value: f64) {
        self.store.set_rounded(channel, value);
    }

    /// Replace any transition on `channel` with a linear fade to `target` over `duration`.
    pub fn start_linear(
        &mut self,
        channel: Channel,
        target: f64,
        duration: Duration,
        sender: &mut dyn FrameSender,
    ) -> TransitionId {
        self.cancel(channel, false, sender);

        let target = round_channel_value(target);
        let current = self.store.get(channel);
        let plan = plan_linear_fade(current, target, duration, self.rate);
        let id = self.allocate_id();
        tracing::debug!(%channel, current, target, ?duration, ticks = plan.len(), "start linear fade");

        let last = plan.len() - 1;
        let ticks = plan.into_iter().enumerate().map(|(i, step)| {
            let tick = Tick {
                writes: smallvec![ChannelWrite::new(channel, step.value)],
                completes: (i == last).then_some(id),
            };
            (step.offset, tick)
        });
        self.register(
            id,
            TransitionKind::Linear,
            smallvec![channel],
            Some(target),
            smallvec![ChannelWrite::new(channel, target)],
            ticks,
        );
        id
    }

    /// Solve `req` and replace the transitions on its pan and tilt channels with the arc.
    ///
    /// The arc is solved before anything is cancelled: a rejected request leaves the store and any
    /// running transitions untouched.
    pub fn start_arc(
        &mut self,
        req: &ArcRequest,
        sender: &mut dyn FrameSender,
    ) -> MotionResult<TransitionId> {
        let path = solve_arc(req)?;
        let pan_ch = req.fixture.pan_channel;
        let tilt_ch = req.fixture.tilt_channel;

        let (final_pan, final_tilt) = path.final_values();
        let samples = path.into_iter();
        let count = samples.len();
        if count == 0 {
            return Err(MotionError::invalid_arc_payload("arc produced no samples"));
        }

        self.cancel(tilt_ch, false, sender);
        self.cancel(pan_ch, false, sender);
        let id = self.allocate_id();
        tracing::debug!(
            pan = %pan_ch,
            tilt = %tilt_ch,
            samples = count,
            final_pan,
            final_tilt,
            "start arc"
        );

        let ticks = samples.enumerate().map(|(i, s)| {
            let tick = Tick {
                writes: smallvec![
                    ChannelWrite::new(tilt_ch, s.tilt),
                    ChannelWrite::new(pan_ch, s.pan)
                ],
                completes: (i + 1 == count).then_some(id),
            };
            (s.offset, tick)
        });
        self.register(
            id,
            TransitionKind::Arc,
            smallvec![pan_ch, tilt_ch],
            None,
            smallvec![
                ChannelWrite::new(tilt_ch, final_tilt),
                ChannelWrite::new(pan_ch, final_pan)
            ],
            ticks,
        );
        Ok(id)
    }

    /// Cancel the transition on `channel`, forcing its finalize values into the store.
    ///
    /// Sends one frame unless `skip_send`. Returns `false` (and sends nothing) when the channel had
    /// no active transition.
    pub fn cancel(&mut self, channel: Channel, skip_send: bool, sender: &mut dyn FrameSender) -> bool {
        let Some(id) = self.by_channel.get(&channel).copied() else {
            return false;
        };
        self.finalize(id);
        if !skip_send {
            sender.send(self.store.as_slice());
        }
        true
    }

    /// Cancel everything, applying every finalize value. Sends nothing.
    pub fn cancel_all(&mut self) {
        let ids: Vec<TransitionId> = self.transitions.keys().copied().collect();
        for id in ids {
            self.finalize(id);
        }
    }

    /// Fire every tick due at or before `t`, sending one frame per tick, then move the clock to `t`.
    ///
    /// Returns the number of ticks fired.
    pub fn advance_to(&mut self, t: Duration, sender: &mut dyn FrameSender) -> usize {
        let mut fired = 0;
        while let Some(f) = self.timers.pop_due(t) {
            self.fire(f.event, sender);
            fired += 1;
        }
        self.timers.advance_clock(t);
        fired
    }

    pub fn advance_by(&mut self, dt: Duration, sender: &mut dyn FrameSender) -> usize {
        let t = self.now() + dt;
        self.advance_to(t, sender)
    }

    /// Fire the earliest pending tick only. Returns its due time.
    pub fn fire_next(&mut self, sender: &mut dyn FrameSender) -> Option<Duration> {
        let due = self.timers.next_due()?;
        let f = self.timers.pop_due(due)?;
        self.fire(f.event, sender);
        Some(f.due)
    }

    /// Give the store back, e.g. to persist it after [`TransitionScheduler::cancel_all`].
    pub fn into_store(self) -> ChannelStore {
        self.store
    }

    fn allocate_id(&mut self) -> TransitionId {
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn register(
        &mut self,
        id: TransitionId,
        kind: TransitionKind,
        channels: SmallVec<[Channel; 2]>,
        target_value: Option<u8>,
        finalize: Writes,
        ticks: impl IntoIterator<Item = (Duration, Tick)>,
    ) {
        let pending = ticks
            .into_iter()
            .map(|(offset, tick)| self.timers.schedule(offset, tick))
            .collect();
        for ch in &channels {
            self.by_channel.insert(*ch, id);
        }
        self.transitions.insert(
            id,
            Transition {
                kind,
                channels,
                target_value,
                pending,
                finalize,
            },
        );
    }

    fn finalize(&mut self, id: TransitionId) {
        let Some(t) = self.retire(id) else {
            return;
        };
        let dropped = t
            .pending
            .iter()
            .filter(|h| self.timers.cancel(**h).is_some())
            .count();
        for w in &t.finalize {
            self.store.set(w.channel, w.value);
        }
        tracing::debug!(?id, kind = ?t.kind, dropped, "cancelled transition");
    }

    fn retire(&mut self, id: TransitionId) -> Option<Transition> {
        let t = self.transitions.remove(&id)?;
        for ch in &t.channels {
            if self.by_channel.get(ch) == Some(&id) {
                self.by_channel.remove(ch);
            }
        }
        Some(t)
    }

    fn fire(&mut self, tick: Tick, sender: &mut dyn FrameSender) {
        for w in &tick.writes {
            self.store.set(w.channel, w.value);
        }
        sender.send(self.store.as_slice());
        if let Some(id) = tick.completes {
            self.retire(id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/scheduler.rs"]
mod tests;
