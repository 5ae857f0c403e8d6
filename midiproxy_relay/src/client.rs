//! The relaying side: MIDI packets in, frames out.
//!
//! Two threads are involved:
//!
//! - The input thread pulls packet lists from the source, decodes them, displays
//!   every event, and pushes it into the event queue.
//! - The calling thread owns the connection, and sends whatever comes out of the queue.

use core::{num, ops::ControlFlow, time::Duration};
use std::{io, thread};

use crate::{
    network::{
        client::{SendStats, Sender, SenderConfig},
        proto::{Event, PacketDecoder, RawPacket},
    },
    utils::{Waker, queue},
};

pub const DEFAULT_QUEUE_CAPACITY: num::NonZeroUsize = num::NonZeroUsize::new(1024).unwrap();

const IDLE_PARK_TIMEOUT: Duration = Duration::from_millis(100);

/// What happened during a [`start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Events decoded from the source.
    pub decoded: usize,
    /// Events that didn't fit in the queue.
    pub dropped: u64,
    /// `None` if we couldn't connect, and only displayed events.
    pub sent: Option<SendStats>,
}

fn input_thread_run(
    mut tx: queue::EventTx,
    packets: impl Iterator<Item = io::Result<Vec<RawPacket>>>,
) -> io::Result<(usize, u64)> {
    let mut decoded = 0usize;

    let mut display = |event: Event| {
        tracing::info!("Received: {event}");
        tx.push(event);
    };

    for packet_list in packets {
        decoded = decoded.strict_add(PacketDecoder::new(&mut display).receive(packet_list?));
    }

    Ok((decoded, tx.dropped()))
}

/// Discards everything until the producer is gone.
fn display_only_run(rx: &mut queue::EventRx) {
    loop {
        let abandoned = rx.is_abandoned();

        rx.drain().for_each(drop);

        if abandoned {
            break;
        }

        rx.wait(IDLE_PARK_TIMEOUT);
    }
}

/// Connects to the remote listener, then relays every packet list from `packets`,
/// until it is exhausted.
///
/// If connecting fails, events are still decoded and displayed, but not sent.
/// Send failures are logged and don't stop the relay.
pub fn start(
    config: &SenderConfig,
    queue_capacity: num::NonZeroUsize,
    packets: impl Iterator<Item = io::Result<Vec<RawPacket>>> + Send + 'static,
) -> anyhow::Result<Summary> {
    // blocks for at most config.connect_timeout, before any packet is read
    let sender = match Sender::connect(config) {
        Ok(sender) => {
            tracing::info!("connected to {}:{}", config.host, config.port);
            Some(sender)
        }
        Err(e) => {
            tracing::warn!("{e}, events will only be displayed");
            None
        }
    };

    let (tx, mut rx) = queue::event_queue(queue_capacity, Waker::new(thread::current()));

    let input_thread_handle = thread::spawn(move || input_thread_run(tx, packets));

    let sent = sender.map(|mut sender| {
        let stats = sender.run(&mut rx, |event, e| {
            tracing::error!("couldn't send {event}: {e}");
            ControlFlow::Continue(())
        });

        if let Err(e) = sender.close() {
            tracing::debug!("error while closing connection: {e}");
        }

        stats
    });

    if sent.is_none() {
        display_only_run(&mut rx);
    }

    let (decoded, dropped) = input_thread_handle
        .join()
        .map_err(|_| anyhow::anyhow!("input thread panicked"))??;

    Ok(Summary {
        decoded,
        dropped,
        sent,
    })
}
