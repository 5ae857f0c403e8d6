//! Transport for the frames defined in the `midiproxy_proto` crate.
//!
//! ## Scope
//!
//! - [`client`]: a [`Sender`](client::Sender) owning a single stream connection
//!   to the remote listener, and the loop that drains decoded events into it.
//! - [`server`]: the remote listener's side, reading frames back off a stream.
//!
//! Frames are sent over TCP, one write per event, with no batching, acknowledgment or
//! retries. Connecting is the only operation with a timeout.

pub mod client;
pub mod server;

pub use midiproxy_proto as proto;
pub use midiproxy_utils as utils;

use std::io;

/// Failure to establish the connection. No sender exists in that case.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to resolve remote address: {0}")]
    Resolve(#[source] io::Error),
    #[error("remote address did not resolve to anything")]
    NoAddress,
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
}

/// Failure to send a frame.
///
/// The connection is left as is, callers may keep using it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection is closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}
