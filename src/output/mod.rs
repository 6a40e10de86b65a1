//! Frame senders: where the channel frame goes after each batch of writes.

mod artnet;

pub use artnet::{ARTNET_PORT, ArtNetSender, build_artdmx_packet};

/// Receives the full channel frame after each visible batch of writes.
///
/// Sending is fire-and-forget. Implementations log their own failures instead of returning them.
pub trait FrameSender {
    fn send(&mut self, frame: &[u8]);

    /// Switch the universe subsequent frames are addressed to.
    fn set_universe(&mut self, _universe: u16) {}
}

/// Drops every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSender;

impl FrameSender for NullSender {
    fn send(&mut self, _frame: &[u8]) {}
}

/// Counts frames without keeping them.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingSender {
    frames: u64,
}

impl CountingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.frames
    }
}

impl FrameSender for CountingSender {
    fn send(&mut self, _frame: &[u8]) {
        self.frames += 1;
    }
}

/// A frame captured by [`RecordingSender`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentFrame {
    pub universe: u16,
    pub values: Vec<u8>,
}

/// Keeps a copy of every frame in send order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSender {
    universe: u16,
    frames: Vec<SentFrame>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[SentFrame] {
        &self.frames
    }

    pub fn count(&self) -> usize {
        self.frames.len()
    }

    pub fn last(&self) -> Option<&SentFrame> {
        self.frames.last()
    }

    /// Value of a 1-based channel in every recorded frame.
    pub fn channel_history(&self, channel: u16) -> Vec<u8> {
        let idx = usize::from(channel.saturating_sub(1));
        self.frames
            .iter()
            .map(|f| f.values.get(idx).copied().unwrap_or(0))
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl FrameSender for RecordingSender {
    fn send(&mut self, frame: &[u8]) {
        self.frames.push(SentFrame {
            universe: self.universe,
            values: frame.to_vec(),
        });
    }

    fn set_universe(&mut self, universe: u16) {
        self.universe = universe;
    }
}

impl<T: FrameSender + ?Sized> FrameSender for Box<T> {
    fn send(&mut self, frame: &[u8]) {
        (**self).send(frame);
    }

    fn set_universe(&mut self, universe: u16) {
        (**self).set_universe(universe);
    }
}
