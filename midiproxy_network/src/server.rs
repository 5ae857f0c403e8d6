//! Server-side TCP implementation: the remote listener receiving frames.
//!
//! Only one connection is served at a time, frames are read in the order they
//! were sent.

use core::{convert::Infallible, net::SocketAddr};
use std::{
    io::{self, Read},
    net::{TcpListener, TcpStream},
};

use crate::proto::{self, FRAME_LEN};

/// Reads fixed-size frames off a byte stream.
///
/// Partially read frames are kept across calls, so this can be used with
/// non-blocking readers, or readers with a timeout.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buf: arrayvec::ArrayVec<u8, FRAME_LEN>,
}

impl<R: Read> FrameReader<R> {
    #[inline(always)]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: arrayvec::ArrayVec::new_const(),
        }
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` if the stream ended cleanly, between two frames. If it ended
    /// in the middle of one, an [`UnexpectedEof`](io::ErrorKind::UnexpectedEof)
    /// error is returned instead.
    pub fn next_frame(&mut self) -> io::Result<Option<proto::Frame>> {
        while !self.buf.is_full() {
            let mut scratch = [0u8; FRAME_LEN];
            let scratch = &mut scratch[..self.buf.remaining_capacity()];

            match self.reader.read(scratch) {
                Ok(0) if self.buf.is_empty() => return Ok(None),
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                // never more than the remaining capacity
                Ok(n) => self.buf.extend(scratch[..n].iter().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&self.buf);
        self.buf.clear();

        Ok(Some(proto::Frame::from_bytes(bytes)))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = io::Result<proto::Frame>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Encapsulates the listener's reaction to incoming frames.
pub trait ServerState {
    /// Called on every received frame.
    ///
    /// `payload` is an error if the frame couldn't be validated, the stream
    /// is then most likely not speaking our protocol.
    fn on_frame(
        &mut self,
        peer_addr: SocketAddr,
        payload: Result<proto::Payload, proto::FrameError>,
    ) -> io::Result<()>;

    /// Reads frames from `stream` until it is closed by the peer.
    ///
    /// Any read error ends the connection, including timeouts set on `stream`.
    fn serve_connection(&mut self, stream: TcpStream) -> io::Result<()> {
        let peer_addr = stream.peer_addr()?;
        let mut frames = FrameReader::new(stream);

        log::debug!("accepted connection from {peer_addr}");

        while let Some(frame) = frames.next_frame()? {
            self.on_frame(peer_addr, frame.payload())?;
        }

        log::debug!("{peer_addr} disconnected");

        Ok(())
    }

    /// Starts the accept loop.
    ///
    /// Connections are served one after the other. A connection ending with
    /// an error is logged, and the next one is accepted.
    ///
    /// The function only returns if accepting fails.
    fn start(&mut self, listener: &TcpListener) -> io::Result<Infallible> {
        loop {
            let (stream, peer_addr) = listener.accept()?;

            if let Err(e) = self.serve_connection(stream) {
                log::warn!("connection with {peer_addr} failed: {e}");
            }
        }
    }
}

impl<F> ServerState for F
where
    F: FnMut(SocketAddr, Result<proto::Payload, proto::FrameError>) -> io::Result<()>,
{
    #[inline(always)]
    fn on_frame(
        &mut self,
        peer_addr: SocketAddr,
        payload: Result<proto::Payload, proto::FrameError>,
    ) -> io::Result<()> {
        self(peer_addr, payload)
    }
}
