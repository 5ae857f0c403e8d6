use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Note;

/// A 1-based MIDI channel, always in `1..=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(16);

    #[inline(always)]
    pub const fn new(channel: u8) -> Option<Self> {
        if channel >= Self::MIN.0 && channel <= Self::MAX.0 {
            Some(Self(channel))
        } else {
            None
        }
    }

    /// Extracts the channel from the low nibble of a status byte.
    #[inline(always)]
    pub const fn from_status(status: u8) -> Self {
        Self((status & 0x0F) + 1)
    }

    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    #[inline(always)]
    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        Self::new(channel).ok_or(channel)
    }
}

impl From<Channel> for u8 {
    #[inline(always)]
    fn from(channel: Channel) -> Self {
        channel.get()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The only kinds of messages we relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NoteOff,
    NoteOn,
}

impl EventKind {
    /// The value of the `type` field of a [`Frame`](crate::Frame).
    #[inline(always)]
    pub const fn wire_type(self) -> u8 {
        match self {
            Self::NoteOff => 0,
            Self::NoteOn => 1,
        }
    }

    #[inline(always)]
    pub const fn from_wire_type(ty: u8) -> Option<Self> {
        match ty {
            0 => Some(Self::NoteOff),
            1 => Some(Self::NoteOn),
            _ => None,
        }
    }
}

/// A decoded note event.
///
/// Events are produced by the [packet decoder](crate::decode) and are plain values:
/// cheap to copy, and never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Opaque, monotonic tick supplied by the upstream producer.
    ///
    /// Not part of the wire format.
    pub timestamp: u64,
    pub channel: Channel,
    pub note: Note,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {:?} Channel: {} Note: {}",
            self.kind, self.channel, self.note
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_bounds() {
        assert_eq!(Channel::new(0), None);
        assert_eq!(Channel::new(1), Some(Channel::MIN));
        assert_eq!(Channel::new(16), Some(Channel::MAX));
        assert_eq!(Channel::new(17), None);
    }

    #[test]
    fn channel_from_status_ignores_high_nibble() {
        assert_eq!(Channel::from_status(0x90).get(), 1);
        assert_eq!(Channel::from_status(0x8F).get(), 16);
        assert_eq!(Channel::from_status(0xE5).get(), 6);
    }

    #[test]
    fn wire_types() {
        assert_eq!(EventKind::NoteOff.wire_type(), 0);
        assert_eq!(EventKind::NoteOn.wire_type(), 1);
        assert_eq!(EventKind::from_wire_type(1), Some(EventKind::NoteOn));
        assert_eq!(EventKind::from_wire_type(2), None);
    }

    #[test]
    fn display() {
        let event = Event {
            kind: EventKind::NoteOn,
            timestamp: 42,
            channel: Channel::MIN,
            note: Note::new(60).unwrap(),
        };

        assert_eq!(event.to_string(), "Type: NoteOn Channel: 1 Note: C4");
    }

    #[test]
    fn serde_rejects_bad_channel() {
        let bytes = postcard::to_stdvec(&0u8).unwrap();
        assert!(postcard::from_bytes::<Channel>(&bytes).is_err());

        let bytes = postcard::to_stdvec(&Channel::MAX).unwrap();
        assert_eq!(postcard::from_bytes::<Channel>(&bytes).unwrap(), Channel::MAX);
    }
}
