use tracing::trace;

use crate::errors::Error;

/// Fixed capacity ring of timestamps that retains the last `capacity` values.
///
/// Every value is written twice, at `head` and at `head - capacity`, into a
/// backing store of `2 * capacity` slots. The retained values therefore always
/// sit in one contiguous run of the store and the window can be read oldest to
/// newest as a plain slice, with no wrap-around arithmetic on the read path.
///
/// Once `capacity` values have been put the ring stays full and every further
/// `put` silently evicts the oldest value.
///
/// # Invariants
/// - `head` is in `[capacity, 2 * capacity)` and is the next slot to write.
/// - `store[i] == store[i + capacity]` for every `i` in `[0, capacity)`.
/// - `count <= capacity`.
#[derive(Debug, Clone)]
pub struct FixedWindowRingBuffer {
    store: Vec<u64>,
    capacity: usize,
    head: usize,
    count: usize,
}

impl FixedWindowRingBuffer {
    /// Allocates a ring with `2 * capacity` zeroed slots.
    ///
    /// `capacity` must be positive. A zero capacity is a caller error that
    /// trips a debug assertion and otherwise panics on the first `put`. Use
    /// [`try_new`](Self::try_new) when the capacity is not known to be valid.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be positive");
        Self {
            store: vec![0; 2 * capacity],
            capacity,
            head: capacity,
            count: 0,
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self::new(capacity))
    }

    /// Empties the ring without reallocating.
    ///
    /// Old slot contents are left in place and become unreachable through the
    /// checked accessors.
    pub fn reset(&mut self) {
        trace!(
            capacity = self.capacity,
            discarded = self.count,
            "ring buffer reset"
        );
        self.head = self.capacity;
        self.count = 0;
    }

    #[inline(always)]
    pub fn put(&mut self, val: u64) {
        let mirror = self.head - self.capacity;
        self.store[self.head] = val;
        self.store[mirror] = val;
        self.head = (mirror + 1) % self.capacity + self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// Oldest retained value, or `None` if nothing was put since the last reset.
    #[inline(always)]
    pub fn oldest(&self) -> Option<u64> {
        if self.count == 0 {
            None
        } else {
            Some(self.oldest_or_stale())
        }
    }

    /// Oldest retained value without an emptiness check.
    ///
    /// CAUTION: on an empty ring this returns whatever sits in the first slot,
    /// zero on a fresh ring and a stale value after a `reset`. Only trust the
    /// result when [`len`](Self::len) is non zero.
    #[inline(always)]
    pub fn oldest_or_stale(&self) -> u64 {
        if self.count < self.capacity {
            self.store[0]
        } else {
            // Mirror of the slot the next `put` overwrites.
            self.store[self.head]
        }
    }

    /// Retained values ordered from oldest to newest.
    #[inline(always)]
    pub fn window(&self) -> &[u64] {
        if self.count < self.capacity {
            &self.store[..self.count]
        } else {
            &self.store[self.head - self.capacity..self.head]
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, values: &[u64]) -> FixedWindowRingBuffer {
        let mut ring = FixedWindowRingBuffer::new(capacity);
        for &v in values {
            ring.put(v);
        }
        ring
    }

    #[test]
    fn evicts_oldest_once_saturated() {
        let mut ring = filled(3, &[10, 20, 30]);
        assert_eq!(ring.oldest(), Some(10));
        assert!(ring.is_full());

        ring.put(40);
        assert_eq!(ring.oldest(), Some(20));
        assert_eq!(ring.window(), &[20, 30, 40]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn window_before_saturation_is_insertion_order() {
        let ring = filled(5, &[7, 8]);
        assert_eq!(ring.window(), &[7, 8]);
        assert_eq!(ring.oldest(), Some(7));
        assert!(!ring.is_full());
    }

    #[test]
    fn capacity_one_keeps_latest() {
        let ring = filled(1, &[1, 2, 3]);
        assert_eq!(ring.oldest(), Some(3));
        assert_eq!(ring.window(), &[3]);
    }

    #[test]
    fn empty_ring_reads_first_slot() {
        let fresh = FixedWindowRingBuffer::new(4);
        assert_eq!(fresh.oldest(), None);
        assert_eq!(fresh.oldest_or_stale(), 0);
        assert!(fresh.window().is_empty());

        // Puts land in slots 0, 1, 2, 0, 1 so slot 0 ends up holding 4.
        let mut ring = filled(3, &[1, 2, 3, 4, 5]);
        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(ring.oldest(), None);
        assert_eq!(ring.oldest_or_stale(), 4);
    }

    #[test]
    fn reset_matches_fresh_allocation() {
        let mut reused = filled(3, &[100, 200, 300, 400]);
        reused.reset();
        let fresh = filled(3, &[1, 2, 3]);
        for v in [1, 2, 3].iter() {
            reused.put(*v);
        }
        assert_eq!(reused.window(), fresh.window());
        assert_eq!(reused.oldest(), fresh.oldest());
        assert_eq!(reused.oldest_or_stale(), fresh.oldest_or_stale());
    }

    #[test]
    fn try_new_rejects_zero_capacity() {
        assert_eq!(
            FixedWindowRingBuffer::try_new(0).unwrap_err(),
            Error::InvalidCapacity(0)
        );
        assert_eq!(FixedWindowRingBuffer::try_new(2).unwrap().capacity(), 2);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_put_panics() {
        let mut ring = FixedWindowRingBuffer::new(0);
        ring.put(1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn oldest_is_value_pushed_capacity_ago(
            capacity in 1usize..64,
            values in prop::collection::vec(any::<u64>(), 1..300)
        ) {
            let mut ring = FixedWindowRingBuffer::new(capacity);
            for &v in &values {
                ring.put(v);
            }
            let first_kept = values.len().saturating_sub(capacity);
            prop_assert_eq!(ring.oldest(), Some(values[first_kept]));
            prop_assert_eq!(ring.window(), &values[first_kept..]);
            prop_assert_eq!(ring.len(), values.len().min(capacity));
        }

        #[test]
        fn halves_of_the_store_mirror_each_other(
            capacity in 1usize..64,
            values in prop::collection::vec(any::<u64>(), 1..300),
            reset_at in any::<prop::sample::Index>()
        ) {
            let reset_at = reset_at.index(values.len());
            let mut ring = FixedWindowRingBuffer::new(capacity);
            for (i, &v) in values.iter().enumerate() {
                if i == reset_at {
                    ring.reset();
                }
                ring.put(v);
                let (lower, upper) = ring.store.split_at(capacity);
                prop_assert_eq!(lower, upper);
                prop_assert!(ring.head >= capacity && ring.head < 2 * capacity);
            }
        }

        #[test]
        fn reset_is_indistinguishable_from_fresh(
            capacity in 1usize..32,
            junk in prop::collection::vec(any::<u64>(), 0..100),
            values in prop::collection::vec(any::<u64>(), 1..100)
        ) {
            let mut reused = FixedWindowRingBuffer::new(capacity);
            for &v in &junk {
                reused.put(v);
            }
            reused.reset();
            let mut fresh = FixedWindowRingBuffer::new(capacity);
            for &v in &values {
                reused.put(v);
                fresh.put(v);
            }
            prop_assert_eq!(reused.window(), fresh.window());
            prop_assert_eq!(reused.oldest(), fresh.oldest());
            prop_assert_eq!(reused.oldest_or_stale(), fresh.oldest_or_stale());
        }
    }
}
