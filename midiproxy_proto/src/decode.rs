//! Packet decoding: raw MIDI packets in, [`Event`]s out.

use crate::{Channel, Event, EventKind, Note};

/// A single packet as delivered by the upstream producer.
///
/// Only the first three bytes of a packet (status, data1, data2) are ever inspected.
/// `length` is the length the producer declared for the packet, which may be smaller
/// than three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPacket {
    pub timestamp: u64,
    pub length: u16,
    pub data: [u8; 3],
}

impl RawPacket {
    #[inline(always)]
    pub const fn new(timestamp: u64, length: u16, data: [u8; 3]) -> Self {
        Self {
            timestamp,
            length,
            data,
        }
    }

    /// Builds a packet from a byte slice, missing bytes are zeroed.
    #[inline]
    pub fn from_bytes(timestamp: u64, bytes: &[u8]) -> Self {
        let mut data = [0; 3];

        for (dest, &src) in core::iter::zip(&mut data, bytes) {
            *dest = src;
        }

        Self {
            timestamp,
            length: u16::try_from(bytes.len()).unwrap_or(u16::MAX),
            data,
        }
    }

    #[inline(always)]
    pub const fn status(&self) -> u8 {
        self.data[0]
    }
}

// channel voice messages
const STATUS_RANGE: core::ops::RangeInclusive<u8> = 0x80..=0xEF;

const NOTE_OFF: u8 = 0x8;
const NOTE_ON: u8 = 0x9;

#[inline(always)]
fn event_kind(packet: &RawPacket) -> Option<EventKind> {
    let [status, _data1, data2] = packet.data;

    if !STATUS_RANGE.contains(&status) {
        return None;
    }

    match status >> 4 {
        NOTE_OFF => Some(EventKind::NoteOff),
        // velocity 0 means note off
        NOTE_ON if data2 == 0 => Some(EventKind::NoteOff),
        NOTE_ON => Some(EventKind::NoteOn),
        _ => None,
    }
}

/// Decodes a single packet.
///
/// Returns `None` for anything that isn't a well-formed note on/off message.
/// This is a filter, not an error.
#[inline]
pub fn decode(packet: &RawPacket) -> Option<Event> {
    // a status byte and two data bytes
    if packet.length <= 2 {
        return None;
    }

    let kind = event_kind(packet)?;
    let note = Note::new(packet.data[1])?;

    Some(Event {
        kind,
        timestamp: packet.timestamp,
        channel: Channel::from_status(packet.status()),
        note,
    })
}

/// Receives decoded events.
pub trait EventListener {
    fn on_event(&mut self, event: Event);
}

impl<F: FnMut(Event)> EventListener for F {
    #[inline(always)]
    fn on_event(&mut self, event: Event) {
        self(event)
    }
}

/// Decodes packet lists and forwards every resulting event to a listener.
///
/// The listener is borrowed, not owned: the decoder never outlives it.
pub struct PacketDecoder<'l, L: ?Sized> {
    listener: &'l mut L,
}

impl<'l, L: EventListener + ?Sized> PacketDecoder<'l, L> {
    #[inline(always)]
    pub fn new(listener: &'l mut L) -> Self {
        Self { listener }
    }

    /// Decodes `packets` in order, notifying the listener once per decoded event.
    ///
    /// Returns how many events were produced.
    #[inline]
    pub fn receive(&mut self, packets: impl IntoIterator<Item = RawPacket>) -> usize {
        let mut n_events = 0usize;

        for event in packets.into_iter().filter_map(|p| decode(&p)) {
            self.listener.on_event(event);
            n_events = n_events.strict_add(1);
        }

        n_events
    }
}
