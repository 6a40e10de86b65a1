use crate::foundation::error::MotionError;

/// Lowest value a channel slot can hold.
pub const MIN_CHANNEL_VALUE: u8 = 0;
/// Highest value a channel slot can hold.
pub const MAX_CHANNEL_VALUE: u8 = 255;

/// 1-based channel address inside a fixture frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "i64", into = "u16")]
pub struct Channel(u16);

impl Channel {
    /// Build a channel from a known-good address.
    ///
    /// Panics if `address` is 0; prefer [`Channel::from_address`] for inbound data.
    pub const fn at(address: u16) -> Self {
        assert!(address > 0, "channel addresses are 1-based");
        Self(address)
    }

    /// Build a channel from a raw inbound address.
    ///
    /// Non-positive (and out of `u16` range) addresses yield `None`; callers drop those writes.
    pub fn from_address(address: i64) -> Option<Self> {
        if address <= 0 {
            return None;
        }
        u16::try_from(address).ok().map(Self)
    }

    /// The 1-based address.
    pub fn get(self) -> u16 {
        self.0
    }

    /// 0-based slot index in the channel store.
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl TryFrom<i64> for Channel {
    type Error = MotionError;

    fn try_from(address: i64) -> Result<Self, Self::Error> {
        Self::from_address(address).ok_or_else(|| {
            MotionError::validation(format!("channel address must be in 1..=65535, got {address}"))
        })
    }
}

impl From<Channel> for u16 {
    fn from(ch: Channel) -> Self {
        ch.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// A single `(channel, value)` write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelWrite {
    pub channel: Channel,
    pub value: u8,
}

impl ChannelWrite {
    pub fn new(channel: Channel, value: u8) -> Self {
        Self { channel, value }
    }
}

/// Round to the nearest integer and clamp into `[0, 255]`.
///
/// `NaN` maps to 0.
pub fn round_channel_value(value: f64) -> u8 {
    if value.is_nan() {
        return MIN_CHANNEL_VALUE;
    }
    value
        .round()
        .clamp(f64::from(MIN_CHANNEL_VALUE), f64::from(MAX_CHANNEL_VALUE)) as u8
}

/// Clamp into `[0, 255]` without rounding.
pub fn validate_channel_value(value: f64) -> f64 {
    if value.is_nan() {
        return f64::from(MIN_CHANNEL_VALUE);
    }
    value.clamp(f64::from(MIN_CHANNEL_VALUE), f64::from(MAX_CHANNEL_VALUE))
}
