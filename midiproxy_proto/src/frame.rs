//! The wire representation of an [`Event`].

use core::fmt;

use crate::{Channel, Event, EventKind, Note};

/// Every frame starts with this value, little endian.
pub const PROTOCOL_IDENTIFIER: u32 = 13_371_337;

pub const FRAME_LEN: usize =
    // protocol identifier (little endian)
    size_of::<u32>()
    // type
    + size_of::<u8>()
    // channel
    + size_of::<u8>()
    // note
    + size_of::<u8>();

/// A fixed-size, unpadded message, sent once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Serializes an event. The timestamp is dropped.
    #[inline]
    pub const fn encode(event: &Event) -> Self {
        let [i0, i1, i2, i3] = PROTOCOL_IDENTIFIER.to_le_bytes();

        Self([
            i0,
            i1,
            i2,
            i3,
            event.kind.wire_type(),
            event.channel.get(),
            event.note.get(),
        ])
    }

    /// Wraps bytes received from the wire, no validation is done here.
    ///
    /// See [`Frame::payload`].
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    #[inline(always)]
    pub const fn protocol_identifier(&self) -> u32 {
        let [i0, i1, i2, i3, ..] = self.0;
        u32::from_le_bytes([i0, i1, i2, i3])
    }

    /// Parses and validates every field of this frame.
    #[inline]
    pub fn payload(&self) -> Result<Payload, FrameError> {
        let [.., ty, channel, note] = self.0;

        let id = self.protocol_identifier();
        if id != PROTOCOL_IDENTIFIER {
            return Err(FrameError::BadIdentifier(id));
        }

        Ok(Payload {
            kind: EventKind::from_wire_type(ty).ok_or(FrameError::BadType(ty))?,
            channel: Channel::new(channel).ok_or(FrameError::BadChannel(channel))?,
            note: Note::new(note).ok_or(FrameError::BadNote(note))?,
        })
    }
}

impl From<&Event> for Frame {
    #[inline(always)]
    fn from(event: &Event) -> Self {
        Self::encode(event)
    }
}

impl AsRef<[u8]> for Frame {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// What a frame carries: an [`Event`] minus its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload {
    pub kind: EventKind,
    pub channel: Channel,
    pub note: Note,
}

impl From<&Event> for Payload {
    #[inline(always)]
    fn from(event: &Event) -> Self {
        Self {
            kind: event.kind,
            channel: event.channel,
            note: event.note,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {:?} Channel: {} Note: {}",
            self.kind, self.channel, self.note
        )
    }
}

/// Why a received frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum FrameError {
    #[error("unknown protocol identifier {0}")]
    BadIdentifier(u32),
    #[error("unknown event type {0}")]
    BadType(u8),
    #[error("channel {0} out of range")]
    BadChannel(u8),
    #[error("note {0} out of range")]
    BadNote(u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawPacket, decode};
    use proptest::prelude::*;

    fn event(kind: EventKind, channel: u8, note: u8) -> Event {
        Event {
            kind,
            timestamp: 0,
            channel: Channel::new(channel).unwrap(),
            note: Note::new(note).unwrap(),
        }
    }

    #[test]
    fn layout() {
        assert_eq!(FRAME_LEN, 7);

        let frame = Frame::encode(&event(EventKind::NoteOn, 1, 60));
        // 13371337 = 0x00CC07C9
        assert_eq!(frame.as_bytes(), &[0xC9, 0x07, 0xCC, 0x00, 1, 1, 60]);
    }

    #[test]
    fn note_on_end_to_end() {
        let event = decode(&RawPacket::new(0, 3, [0x90, 60, 64])).unwrap();
        let payload = Frame::encode(&event).payload().unwrap();

        assert_eq!(Frame::encode(&event).protocol_identifier(), PROTOCOL_IDENTIFIER);
        assert_eq!(payload.kind.wire_type(), 1);
        assert_eq!(payload.channel.get(), 1);
        assert_eq!(payload.note.get(), 60);
    }

    #[test]
    fn timestamp_is_not_transmitted() {
        let mut a = event(EventKind::NoteOff, 3, 10);
        let mut b = a;
        a.timestamp = 1;
        b.timestamp = u64::MAX;

        assert_eq!(Frame::encode(&a), Frame::encode(&b));
    }

    #[test]
    fn rejects_foreign_frames() {
        let good = *Frame::encode(&event(EventKind::NoteOn, 16, 127)).as_bytes();

        let mut bytes = good;
        bytes[0] ^= 1;
        assert!(matches!(
            Frame::from_bytes(bytes).payload(),
            Err(FrameError::BadIdentifier(_))
        ));

        let mut bytes = good;
        bytes[4] = 2;
        assert_eq!(Frame::from_bytes(bytes).payload(), Err(FrameError::BadType(2)));

        let mut bytes = good;
        bytes[5] = 0;
        assert_eq!(Frame::from_bytes(bytes).payload(), Err(FrameError::BadChannel(0)));

        let mut bytes = good;
        bytes[6] = 128;
        assert_eq!(Frame::from_bytes(bytes).payload(), Err(FrameError::BadNote(128)));
    }

    fn any_event() -> impl Strategy<Value = Event> {
        (any::<bool>(), any::<u64>(), 1u8..=16, 0u8..=127).prop_map(|(on, timestamp, c, n)| Event {
            kind: if on { EventKind::NoteOn } else { EventKind::NoteOff },
            timestamp,
            channel: Channel::new(c).unwrap(),
            note: Note::new(n).unwrap(),
        })
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic(event in any_event()) {
            let a = Frame::encode(&event);
            let b = Frame::encode(&event);
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
            prop_assert_eq!(a.protocol_identifier(), PROTOCOL_IDENTIFIER);
        }

        #[test]
        fn payload_matches_event(event in any_event()) {
            let payload = Frame::from_bytes(*Frame::encode(&event).as_bytes()).payload();
            prop_assert_eq!(payload, Ok(Payload::from(&event)));
        }
    }
}
