use std::collections::VecDeque;

/// Variable length FIFO of timestamps.
///
/// Values are pushed at the back and popped from the front. Storage is a
/// growable ring of slots so both ends are amortised O(1) and the queue keeps
/// its own length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequentialEventQueue {
    events: VecDeque<u64>,
}

impl SequentialEventQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` values before it grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn push(&mut self, val: u64) {
        self.events.push_back(val);
    }

    #[inline(always)]
    pub fn pop(&mut self) -> Option<u64> {
        self.events.pop_front()
    }

    /// Pops the oldest value, returning `0` when the queue is empty.
    ///
    /// A stored `0` and an empty queue look the same here. Check
    /// [`len`](Self::len) first or use [`pop`](Self::pop).
    #[inline(always)]
    pub fn pop_or_zero(&mut self) -> u64 {
        self.pop().unwrap_or(0)
    }

    #[inline(always)]
    pub fn peek(&self) -> Option<u64> {
        self.events.front().copied()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    /// Queued values oldest to newest, split where the backing ring wraps.
    pub fn as_slices(&self) -> (&[u64], &[u64]) {
        self.events.as_slices()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}
