//! A single-producer, single-consumer FIFO of decoded events.
//!
//! Pushing never blocks, and never allocates. If the consumer falls behind and the
//! queue fills up, new events are dropped (and counted) rather than stalling the
//! producer.

use core::{num, time::Duration};

use crate::{Waker, proto};

pub use rtrb;

/// Creates a queue able to hold `capacity` events.
///
/// `waker` should wake the thread that will own the returned [`EventRx`].
#[inline]
pub fn event_queue(capacity: num::NonZeroUsize, waker: Waker) -> (EventTx, EventRx) {
    let (tx, rx) = rtrb::RingBuffer::new(capacity.get());

    (EventTx::new(tx, waker), EventRx::new(rx))
}

/// The producing end of an event queue.
#[derive(Debug)]
pub struct EventTx {
    tx: rtrb::Producer<proto::Event>,
    waker: Waker,
    dropped: u64,
}

impl EventTx {
    #[inline(always)]
    pub const fn new(tx: rtrb::Producer<proto::Event>, waker: Waker) -> Self {
        Self {
            tx,
            waker,
            dropped: 0,
        }
    }

    /// Pushes an event without blocking.
    ///
    /// Returns `false` if the queue was full, the event is then discarded.
    ///
    /// Discarding doesn't look at what the event is. A `NoteOff` can be dropped
    /// while its `NoteOn` was queued, leaving the note stuck on the listener's side.
    #[inline]
    pub fn push(&mut self, event: proto::Event) -> bool {
        let pushed = self.tx.push(event).is_ok();

        if pushed {
            self.waker.wake();
        } else {
            self.dropped = self.dropped.strict_add(1);
            log::warn!("event queue full, dropping {event} ({} dropped so far)", self.dropped);
        }

        pushed
    }

    /// How many events were discarded because the queue was full.
    #[inline(always)]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    #[inline(always)]
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_abandoned()
    }
}

impl proto::EventListener for EventTx {
    #[inline(always)]
    fn on_event(&mut self, event: proto::Event) {
        let _ = self.push(event);
    }
}

/// The consuming end of an event queue.
#[derive(Debug)]
pub struct EventRx {
    rx: rtrb::Consumer<proto::Event>,
}

impl EventRx {
    #[inline(always)]
    pub const fn new(rx: rtrb::Consumer<proto::Event>) -> Self {
        Self { rx }
    }

    #[inline(always)]
    pub fn pop(&mut self) -> Option<proto::Event> {
        self.rx.pop().ok()
    }

    /// Removes, in order, every event currently in the queue.
    ///
    /// Events pushed while iterating are not yielded.
    #[inline(always)]
    pub fn drain(&mut self) -> impl Iterator<Item = proto::Event> + '_ {
        // never fails, we only ask for what's available
        self.rx.read_chunk(self.rx.slots()).into_iter().flatten()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// `true` if the producing end has been dropped.
    #[inline(always)]
    pub fn is_abandoned(&self) -> bool {
        self.rx.is_abandoned()
    }

    /// Parks the current thread until woken by the producer, or until `timeout` elapses.
    ///
    /// Returns immediately if events are already available. Spurious wakeups are possible.
    #[inline]
    pub fn wait(&self, timeout: Duration) {
        if self.rx.is_empty() {
            std::thread::park_timeout(timeout);
        }
    }
}
