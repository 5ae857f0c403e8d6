//! Client-side TCP implementation: sending frames to the remote listener.

use core::{ops::ControlFlow, time::Duration};
use std::{
    io::{self, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
};

use crate::{ConnectError, TransportError, proto, utils};

pub const DEFAULT_PORT: u16 = 1337;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the send loop sleeps when there is nothing to send. The producer
/// wakes it up earlier when pushing events.
const IDLE_PARK_TIMEOUT: Duration = Duration::from_millis(100);

/// Where, and how patiently, to connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    /// Connecting is aborted if it takes longer than this, for every resolved address.
    pub connect_timeout: Duration,
}

impl SenderConfig {
    #[inline(always)]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self::new("127.0.0.1")
    }
}

/// A byte stream frames can be written to.
pub trait Stream: Write {
    /// Releases the underlying connection. Only ever called once per stream.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Stream for TcpStream {
    #[inline(always)]
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

impl<S: Stream + ?Sized> Stream for &mut S {
    #[inline(always)]
    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}

/// Sends frames, in order, over a single connection.
///
/// `send` takes `&mut self`, so a sender can't be used from multiple threads at once.
/// Frames never interleave on the wire.
///
/// The connection is released when calling [`close`](Self::close), or when the
/// sender is dropped, whichever comes first.
#[derive(Debug)]
pub struct Sender<S: Stream = TcpStream> {
    stream: Option<S>,
}

impl Sender<TcpStream> {
    /// Connects to the remote listener, blocking for at most
    /// [`config.connect_timeout`](SenderConfig::connect_timeout) per resolved address.
    ///
    /// Don't call this from a latency-sensitive thread.
    pub fn connect(config: &SenderConfig) -> Result<Self, ConnectError> {
        let addrs = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(ConnectError::Resolve)?;

        let mut last_err = None;

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(stream) => {
                    // frames are tiny, don't let them sit in the kernel
                    if let Err(e) = stream.set_nodelay(true) {
                        log::warn!("couldn't disable Nagle's algorithm: {e}");
                    }

                    log::debug!("connected to {addr}");
                    return Ok(Self::from_stream(stream));
                }
                Err(e) => {
                    log::debug!("failed to connect to {addr}: {e}");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.map_or(ConnectError::NoAddress, ConnectError::Connect))
    }
}

impl<S: Stream> Sender<S> {
    /// Wraps an already established connection.
    #[inline(always)]
    pub const fn from_stream(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    #[inline(always)]
    pub const fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Writes the whole frame.
    ///
    /// A failed write may leave part of the frame on the wire. The connection
    /// is kept regardless, it's up to the caller to decide whether to keep using it.
    #[inline]
    pub fn send(&mut self, frame: &proto::Frame) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;

        stream.write_all(frame.as_bytes())?;
        stream.flush()?;

        Ok(())
    }

    #[inline(always)]
    pub fn send_event(&mut self, event: &proto::Event) -> Result<(), TransportError> {
        log::trace!("sending {event}");
        self.send(&proto::Frame::encode(event))
    }

    /// Releases the connection. Calling this more than once does nothing.
    pub fn close(&mut self) -> io::Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        log::debug!("closing connection");

        stream.shutdown()
    }

    /// Sends every event pushed into `rx`, in order, until the producing end is
    /// dropped and the queue is empty.
    ///
    /// Transport errors don't stop the loop, they are reported to `on_error`, which
    /// decides whether to keep going. Events that failed to be sent are not retried.
    ///
    /// This thread should be the one woken by `rx`'s producer.
    pub fn run(
        &mut self,
        rx: &mut utils::queue::EventRx,
        mut on_error: impl FnMut(&proto::Event, TransportError) -> ControlFlow<()>,
    ) -> SendStats {
        let mut stats = SendStats::default();

        loop {
            // read this first, everything pushed before the producer left is then
            // guaranteed to be drained below
            let abandoned = rx.is_abandoned();

            for event in rx.drain() {
                match self.send_event(&event) {
                    Ok(()) => stats.sent = stats.sent.strict_add(1),
                    Err(e) => {
                        stats.failed = stats.failed.strict_add(1);
                        log::warn!("failed to send {event}: {e}");

                        if on_error(&event, e).is_break() {
                            return stats;
                        }
                    }
                }
            }

            if abandoned && rx.is_empty() {
                return stats;
            }

            rx.wait(IDLE_PARK_TIMEOUT);
        }
    }
}

impl<S: Stream> Drop for Sender<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::debug!("error while closing connection: {e}");
        }
    }
}

/// What happened during a [`Sender::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SendStats {
    pub sent: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::{Frame, RawPacket, decode};

    impl Stream for Vec<u8> {}

    /// Accepts a fixed number of bytes, then fails every write.
    struct Flaky {
        written: Vec<u8>,
        budget: usize,
        shutdowns: usize,
    }

    impl Flaky {
        fn new(budget: usize) -> Self {
            Self {
                written: Vec::new(),
                budget,
                shutdowns: 0,
            }
        }
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::ErrorKind::BrokenPipe.into());
            }

            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Stream for Flaky {
        fn shutdown(&mut self) -> io::Result<()> {
            self.shutdowns += 1;
            Ok(())
        }
    }

    fn event(status: u8, data1: u8, data2: u8) -> proto::Event {
        decode(&RawPacket::new(0, 3, [status, data1, data2])).unwrap()
    }

    #[test]
    fn writes_whole_frames() {
        let mut written = Vec::<u8>::new();
        let mut sender = Sender::from_stream(&mut written);

        sender.send_event(&event(0x90, 60, 64)).unwrap();
        sender.send_event(&event(0x90, 60, 0)).unwrap();
        drop(sender);

        assert_eq!(written.len(), 2 * proto::FRAME_LEN);
        assert_eq!(&written[..7], Frame::encode(&event(0x90, 60, 64)).as_bytes());
        assert_eq!(written[7 + 4], 0);
    }

    #[test]
    fn partial_write_is_an_error_and_the_connection_is_kept() {
        let mut flaky = Flaky::new(10);
        let mut sender = Sender::from_stream(&mut flaky);

        assert!(sender.send_event(&event(0x90, 60, 64)).is_ok());
        assert!(matches!(
            sender.send_event(&event(0x90, 61, 64)),
            Err(TransportError::Io(_))
        ));
        assert!(!sender.is_closed());
        assert!(matches!(
            sender.send_event(&event(0x90, 62, 64)),
            Err(TransportError::Io(_))
        ));

        drop(sender);
        assert_eq!(flaky.written.len(), 10);
        assert_eq!(flaky.shutdowns, 1);
    }

    #[test]
    fn close_is_idempotent() {
        let mut flaky = Flaky::new(usize::MAX);
        let mut sender = Sender::from_stream(&mut flaky);

        sender.close().unwrap();
        sender.close().unwrap();
        assert!(sender.is_closed());
        assert!(matches!(
            sender.send_event(&event(0x80, 1, 1)),
            Err(TransportError::Closed)
        ));

        // dropping a closed sender doesn't release again
        drop(sender);
        assert_eq!(flaky.shutdowns, 1);
        assert!(flaky.written.is_empty());
    }

    #[test]
    fn default_config() {
        let config = SenderConfig::new("192.168.0.94");
        assert_eq!(config.port, 1337);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }
}
