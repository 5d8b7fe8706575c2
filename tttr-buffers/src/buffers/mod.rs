//! FIFO buffers for the timestamps of past clicks.
//!
//! [`FixedWindowRingBuffer`] keeps the last N clicks and reads them back as a
//! single contiguous slice. [`SequentialEventQueue`] has no fixed size and is
//! trimmed by age instead. Both hold plain `u64` time tags and are meant for a
//! single owner.

mod circular_buffer;
mod event_queue;

pub use circular_buffer::FixedWindowRingBuffer;
pub use event_queue::SequentialEventQueue;

/// History of past click timestamps as seen by the correlators.
pub trait TimestampFifo {
    fn push_tof(&mut self, tof: u64);

    fn oldest(&self) -> Option<u64>;

    /// Drops retained values that are `<= horizon`.
    fn expire_through(&mut self, horizon: u64);

    fn reset(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retained values from oldest to newest as two consecutive runs.
    fn as_slices(&self) -> (&[u64], &[u64]);
}

impl TimestampFifo for FixedWindowRingBuffer {
    #[inline(always)]
    fn push_tof(&mut self, tof: u64) {
        self.put(tof);
    }

    #[inline(always)]
    fn oldest(&self) -> Option<u64> {
        FixedWindowRingBuffer::oldest(self)
    }

    // The ring is bounded by count, eviction happens on `put`.
    #[inline(always)]
    fn expire_through(&mut self, _horizon: u64) {}

    fn reset(&mut self) {
        FixedWindowRingBuffer::reset(self);
    }

    #[inline(always)]
    fn len(&self) -> usize {
        FixedWindowRingBuffer::len(self)
    }

    #[inline(always)]
    fn as_slices(&self) -> (&[u64], &[u64]) {
        (self.window(), &[])
    }
}

impl TimestampFifo for SequentialEventQueue {
    #[inline(always)]
    fn push_tof(&mut self, tof: u64) {
        self.push(tof);
    }

    #[inline(always)]
    fn oldest(&self) -> Option<u64> {
        self.peek()
    }

    #[inline(always)]
    fn expire_through(&mut self, horizon: u64) {
        while let Some(tof) = self.peek() {
            if tof > horizon {
                break;
            }
            self.pop();
        }
    }

    fn reset(&mut self) {
        self.clear();
    }

    #[inline(always)]
    fn len(&self) -> usize {
        SequentialEventQueue::len(self)
    }

    #[inline(always)]
    fn as_slices(&self) -> (&[u64], &[u64]) {
        SequentialEventQueue::as_slices(self)
    }
}
