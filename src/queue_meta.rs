use std::ops::Range;

use crate::utils::wrap_increment;

/// Coarse occupancy state of a queue.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum BCQueueState {
    Empty,
    PartiallyFull,
    Full,
}

/// Cursor bookkeeping for the circular buffer. Holds no element storage, only
/// the indices and the occupancy counter that decide where the next push and
/// pop land.
///
/// `front` and `back` are both `None` while the queue is empty and both `Some`
/// otherwise. Full and empty are decided by `occupancy` alone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct BCQueueMeta {
    /// index of the oldest unread element
    pub(crate) front: Option<usize>,
    /// index of the most recently written element
    pub(crate) back: Option<usize>,
    pub(crate) occupancy: usize,
    pub(crate) capacity: usize,
}

impl BCQueueMeta {
    pub(crate) fn new(capacity: usize) -> BCQueueMeta {
        debug_assert!(capacity > 0);
        BCQueueMeta {
            front: None,
            back: None,
            occupancy: 0,
            capacity,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.occupancy == self.capacity
    }

    pub(crate) fn state(&self) -> BCQueueState {
        if self.is_empty() {
            BCQueueState::Empty
        } else if self.is_full() {
            BCQueueState::Full
        } else {
            BCQueueState::PartiallyFull
        }
    }

    /// Slot the next push writes into. An empty queue starts over at slot 0.
    pub(crate) fn produce_idx(&self) -> usize {
        match self.back {
            Some(back) => wrap_increment(back, self.capacity),
            None => 0,
        }
    }

    /// Claim the next slot for a push and return its index, or `None` if the
    /// queue is full.
    pub(crate) fn advance_back(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let idx = self.produce_idx();
        self.back = Some(idx);
        if self.front.is_none() {
            self.front = Some(idx);
        }
        self.occupancy += 1;

        debug_assert!(self.occupancy <= self.capacity);
        Some(idx)
    }

    /// Release the front slot for a pop and return its index, or `None` if the
    /// queue is empty.
    pub(crate) fn advance_front(&mut self) -> Option<usize> {
        let (front, back) = match (self.front, self.back) {
            (Some(front), Some(back)) => (front, back),
            _ => {
                debug_assert_eq!(self.occupancy, 0);
                return None;
            }
        };

        if front == back {
            debug_assert_eq!(self.occupancy, 1);
            self.front = None;
            self.back = None;
        } else {
            self.front = Some(wrap_increment(front, self.capacity));
        }
        self.occupancy -= 1;

        Some(front)
    }

    /// The occupied slot indices in FIFO order, as at most two contiguous
    /// ranges: `front..` up to the end of storage, then `0..=back` once wrapped.
    pub(crate) fn occupied_ranges(&self) -> (Range<usize>, Range<usize>) {
        match (self.front, self.back) {
            (Some(front), Some(back)) if front <= back => (front..back + 1, 0..0),
            (Some(front), Some(back)) => (front..self.capacity, 0..back + 1),
            _ => (0..0, 0..0),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.front = None;
        self.back = None;
        self.occupancy = 0;
    }
}
