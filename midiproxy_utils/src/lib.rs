//! Utilities for moving decoded events between threads.
//!
//! MIDI packets usually arrive on a thread owned by the MIDI driver, while the
//! connection to the remote listener must only ever be used from a single thread.
//! The [`queue`] module provides the one handoff point between the two: a lock-free,
//! wait-free ring buffer, paired with a [`Waker`] to notify the consuming thread.

pub mod queue;

pub use midiproxy_proto as proto;

/// Enables waking a thread parked on the receiving end of a [`queue`].
///
/// Use [`Waker::useless`] for a waker that does nothing useful.
#[derive(Debug, Clone)]
pub struct Waker {
    thread_handle: std::thread::Thread,
}

impl Default for Waker {
    fn default() -> Self {
        Self::useless()
    }
}

impl Waker {
    /// Wakes the current thread, which is typically not parked while it's producing.
    #[inline(always)]
    pub fn useless() -> Self {
        Self::new(std::thread::current())
    }

    #[inline(always)]
    pub const fn new(thread_handle: std::thread::Thread) -> Self {
        Self { thread_handle }
    }

    #[inline(always)]
    pub fn wake(&self) {
        self.thread_handle.unpark();
    }
}
