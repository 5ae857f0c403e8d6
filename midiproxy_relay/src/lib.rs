//! A MIDI to TCP relay.
//!
//! [`client`] decodes MIDI packets from an upstream source and forwards every
//! note event to a remote listener. [`server`] is that listener.

pub use midiproxy_network as network;
pub use midiproxy_utils as utils;

pub mod client;
pub mod input;
pub mod server;
