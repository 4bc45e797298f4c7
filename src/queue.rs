//! Module: queue
//!
//! Purpose: Fixed-capacity ring buffer of pending output transitions.
//! This is the heart of the delay line — every delayed edge passes through
//! here between capture and dispatch.
//!
//! # Slot parity
//!
//! A slot stores only a target timestamp. Its *role* comes from the parity of
//! its index:
//!
//! ```text
//! even index  ⇔  "assert the output at this time"
//! odd index   ⇔  "deassert the output at this time"
//! ```
//!
//! Both cursors share the convention, so the reader's parity alone says which
//! output state is current. There is no occupancy counter: the region from
//! `reader` (inclusive) to `writer` (exclusive) in ring order is the pending
//! work, which means cursor equality cannot distinguish empty from full — a
//! writer that laps the reader silently discards a full buffer of entries.
//! Callers size `N` so that cannot happen in normal operation; [`schedule`]
//! reports the lap so it can at least be counted.
//!
//! [`schedule`]: TransitionQueue::schedule
//!
//! # Concurrency
//!
//! None here. The queue is plain data; the engine serializes all access
//! behind its critical section.

use crate::signal::{is_due, Edge, Level};

/// Default queue capacity. At 50 ms latency this absorbs a sustained
/// 5 kHz edge burst; must be even.
pub const DEFAULT_CAPACITY: usize = 512;

/// Ring buffer of pending transition target times.
pub struct TransitionQueue<const N: usize = DEFAULT_CAPACITY> {
    /// Target timestamps; role given by index parity.
    slots: [u32; N],

    /// Next slot to dispatch. Advanced only by [`advance`](Self::advance).
    reader: usize,

    /// Next slot to fill. Advanced only by [`schedule`](Self::schedule).
    writer: usize,
}

impl<const N: usize> TransitionQueue<N> {
    /// Create an empty queue.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is odd or smaller than one edge pair —
    /// slot parity is meaningless on an odd-length ring.
    pub const fn new() -> Self {
        assert!(N >= 2 && N % 2 == 0, "Queue capacity must be even");

        Self {
            slots: [0; N],
            reader: 0,
            writer: 0,
        }
    }

    /// Record a pending transition for `edge` at `target_ms`.
    ///
    /// Edges are expected to alternate rising/falling in step with slot
    /// parity. When two same-role edges arrive back-to-back (missed or
    /// sub-resolution opposite edge), a second entry with the same target is
    /// written to force the parity back into alignment; the pair collapses to
    /// a single effective schedule point at dispatch.
    ///
    /// Returns `true` if the writer lapped the reader — the previous buffer
    /// contents are unreachable and the queue now reads as empty.
    pub fn schedule(&mut self, edge: Edge, target_ms: u32) -> bool {
        let mut lapped = self.push(target_ms);

        // After an aligned insert the writer parity is the opposite role:
        // odd (expect-deassert) after a rising edge, even after a falling.
        let aligned = match edge {
            Edge::Rising => 1,
            Edge::Falling => 0,
        };
        if self.writer % 2 != aligned {
            lapped |= self.push(target_ms);
        }

        lapped
    }

    /// Dispatch every entry due at `now_ms`, in FIFO order.
    ///
    /// Called only from the single polling context. Returns the output level
    /// implied by the reader's resulting parity: an even reader is waiting to
    /// assert, so the output currently reads deasserted, and vice versa.
    pub fn advance(&mut self, now_ms: u32) -> Level {
        while self.reader != self.writer && is_due(now_ms, self.slots[self.reader]) {
            self.reader = (self.reader + 1) % N;
        }
        self.current_level()
    }

    /// Output level implied by the reader parity.
    #[inline]
    pub fn current_level(&self) -> Level {
        if self.reader % 2 == 0 {
            Level::Deasserted
        } else {
            Level::Asserted
        }
    }

    /// Drop all pending work. Stale slot contents are not cleared — the
    /// cursors define validity, not the slot values.
    #[inline]
    pub fn reset(&mut self) {
        self.reader = 0;
        self.writer = 0;
    }

    /// True when no transitions are pending (or the writer has lapped).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reader == self.writer
    }

    /// Queue capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    fn push(&mut self, target_ms: u32) -> bool {
        self.slots[self.writer] = target_ms;
        self.writer = (self.writer + 1) % N;
        self.writer == self.reader
    }
}

impl<const N: usize> Default for TransitionQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
