#![cfg_attr(not(test), no_std)]
//! A tiny protocol for relaying MIDI note events over a stream connection.
//!
//! This crate holds everything that does not touch the network:
//!
//! - The domain model: [`Note`], [`Channel`], [`EventKind`] and [`Event`].
//! - The packet decoder, turning raw MIDI packets into [`Event`]s.
//! - The wire [`Frame`], a fixed-size binary message derived from an [`Event`].
//!
//! ## Packet decoding
//!
//! Packets come from an upstream producer (a MIDI driver, a network MIDI session...)
//! as [`RawPacket`]s. Only channel voice note on/off messages are understood, anything
//! else is silently dropped. Decoding never fails loudly: a packet either yields an
//! [`Event`] or it doesn't.
//!
//! A note on message with a velocity of zero is treated as a note off, as many MIDI
//! sources use that convention.
//!
//! ## Wire format
//!
//! Every decoded event becomes exactly one [`Frame`] of [`FRAME_LEN`] bytes:
//!
//! | offset | size | field                                     |
//! |--------|------|-------------------------------------------|
//! | 0      | 4    | [`PROTOCOL_IDENTIFIER`] (little endian)   |
//! | 4      | 1    | type, `0` = note off, `1` = note on       |
//! | 5      | 1    | channel, in `1..=16`                      |
//! | 6      | 1    | note number, in `0..=127`                 |
//!
//! There is no padding. Event timestamps are not transmitted.
//!
//! The domain types implement `serde`'s `Serialize` and `Deserialize` traits, for
//! the user to conveniently plug into other `serde` backends.

pub mod decode;
pub mod frame;
mod event;
mod note;

pub use decode::{EventListener, PacketDecoder, RawPacket, decode};
pub use event::{Channel, Event, EventKind};
pub use frame::{FRAME_LEN, Frame, FrameError, PROTOCOL_IDENTIFIER, Payload};
pub use note::Note;
