use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::queue_meta::{BCQueueMeta, BCQueueState};
use crate::snapshot::BCQueueSnapshot;
use crate::trace::{debug, warn};
use crate::{BCPushError, BCQueueError};

/// Everything the queue lock protects.
#[derive(Debug)]
pub(crate) struct BCQueueInner<T> {
    pub(crate) meta: BCQueueMeta,
    pub(crate) slots: Vec<Option<T>>,
    pub(crate) closed: bool,
}

impl<T> BCQueueInner<T> {
    /// Write `value` behind the current back cursor. Must be called with the queue lock held.
    pub(crate) fn push(&mut self, value: T) -> Result<(), BCPushError<T>> {
        if self.closed {
            return Err(BCPushError::new(BCQueueError::Closed, value));
        }

        match self.meta.advance_back() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none(), "overwriting live slot {idx}");
                self.slots[idx] = Some(value);
                Ok(())
            }
            None => Err(BCPushError::new(BCQueueError::Full, value)),
        }
    }

    /// Take the element at the front cursor. Must be called with the queue lock held.
    pub(crate) fn pop(&mut self) -> Result<T, BCQueueError> {
        if self.closed {
            return Err(BCQueueError::Closed);
        }

        let idx = self.meta.front.ok_or(BCQueueError::Empty)?;
        // take before moving the cursor so a broken invariant can't leave the meta half-updated
        let value = self.slots[idx]
            .take()
            .expect("front cursor points at an unset slot");
        self.meta.advance_front();

        Ok(value)
    }

    /// Move the live elements out in FIFO order, leaving the queue empty.
    fn drain_fifo(&mut self) -> Vec<T> {
        let (head, tail) = self.meta.occupied_ranges();
        let mut drained = Vec::with_capacity(self.meta.occupancy);
        for idx in head.chain(tail) {
            drained.extend(self.slots[idx].take());
        }
        self.meta.reset();

        drained
    }
}

/// A bounded circular FIFO queue guarded by a single mutex.
///
/// The queue holds at most `capacity` elements. Every operation (push, pop,
/// emptiness checks and snapshots) runs as one critical section under the same
/// lock, so concurrent producers and consumers always observe a consistent
/// front/back/occupancy triple. Share it across threads by reference (e.g. with
/// [`std::thread::scope`]) or behind an [`std::sync::Arc`].
///
/// `try_push`/`try_pop` never block and report [`BCQueueError::Full`] or
/// [`BCQueueError::Empty`]. With the `blocking` feature, `push`/`pop` and their
/// `_timeout` variants wait on condition variables tied to the same lock.
#[derive(Debug)]
pub struct BCQueue<T> {
    inner: Mutex<BCQueueInner<T>>,
    pub(crate) not_empty: Condvar,
    pub(crate) not_full: Condvar,
    capacity: usize,
}

impl<T> BCQueue<T> {
    /// Create an empty queue with room for exactly `capacity` elements.
    ///
    /// # Arguments
    /// * `capacity` - Number of slots to allocate. Fixed for the lifetime of the queue.
    ///
    /// # Returns
    /// `Ok(BCQueue)` with every slot unset and both cursors cleared.
    ///
    /// # Errors
    /// Returns `BCQueueError::InvalidArgs` when `capacity` is zero and
    /// `BCQueueError::AllocationFailed` when the slot storage cannot be reserved.
    ///
    /// # Examples
    /// ```
    /// use yep_bcq::{BCQueue, BCQueueError};
    ///
    /// let queue = BCQueue::<i32>::new(4).unwrap();
    /// assert_eq!(queue.capacity(), 4);
    /// assert!(queue.is_empty());
    ///
    /// assert_eq!(BCQueue::<i32>::new(0).unwrap_err(), BCQueueError::InvalidArgs);
    /// ```
    pub fn new(capacity: usize) -> Result<BCQueue<T>, BCQueueError> {
        if capacity == 0 {
            return Err(BCQueueError::InvalidArgs);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| BCQueueError::AllocationFailed)?;
        slots.resize_with(capacity, || None);

        debug!(capacity, "created queue");

        Ok(BCQueue {
            inner: Mutex::new(BCQueueInner {
                meta: BCQueueMeta::new(capacity),
                slots,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    /// Acquire the queue lock.
    ///
    /// Every critical section leaves the cursors consistent before it can panic, so a
    /// poisoned lock is recovered instead of propagated. The poison flag is cleared on
    /// recovery so later callers take the fast path again.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BCQueueInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("recovering queue lock poisoned by a panicking thread");
            let guard = poisoned.into_inner();
            self.inner.clear_poison();
            guard
        })
    }

    pub(crate) fn recover<G>(result: Result<G, PoisonError<G>>) -> G {
        result.unwrap_or_else(PoisonError::into_inner)
    }

    /// Same recovery as [`Self::lock`] for a guard handed back by a condvar wait.
    #[cfg(feature = "blocking")]
    pub(crate) fn recover_wait<G>(&self, result: Result<G, PoisonError<G>>) -> G {
        result.unwrap_or_else(|poisoned| {
            warn!("recovering queue lock poisoned while waiting");
            let guard = poisoned.into_inner();
            self.inner.clear_poison();
            guard
        })
    }

    /// Push `value` without waiting.
    ///
    /// # Arguments
    /// * `value` - The element to append behind the current back cursor.
    ///
    /// # Returns
    /// `Ok(())` once the value is stored. A waiting consumer, if any, is woken.
    ///
    /// # Errors
    /// Returns a [`BCPushError`] carrying the value back, with `BCQueueError::Full` when every
    /// slot is occupied or `BCQueueError::Closed` after [`close`](Self::close). The queue is left
    /// unchanged in both cases.
    ///
    /// # Examples
    /// ```
    /// use yep_bcq::{BCQueue, BCQueueError};
    ///
    /// let queue = BCQueue::new(1).unwrap();
    /// queue.try_push(1).unwrap();
    ///
    /// let rejected = queue.try_push(2).unwrap_err();
    /// assert_eq!(rejected.error(), BCQueueError::Full);
    /// assert_eq!(rejected.into_inner(), 2);
    /// ```
    pub fn try_push(&self, value: T) -> Result<(), BCPushError<T>> {
        let mut guard = self.lock();
        match guard.push(value) {
            Ok(()) => {
                drop(guard);
                self.not_empty.notify_all();
                Ok(())
            }
            Err(err) => {
                debug!(capacity = self.capacity, "push rejected: {}", err.error);
                Err(err)
            }
        }
    }

    /// Pop the oldest element without waiting.
    ///
    /// # Returns
    /// `Ok` with the element at the front cursor. A waiting producer, if any, is woken.
    ///
    /// # Errors
    /// Returns `BCQueueError::Empty` when nothing is queued or `BCQueueError::Closed` after
    /// [`close`](Self::close). The queue is left unchanged in both cases.
    ///
    /// # Examples
    /// ```
    /// use yep_bcq::{BCQueue, BCQueueError};
    ///
    /// let queue = BCQueue::new(2).unwrap();
    /// assert_eq!(queue.try_pop(), Err(BCQueueError::Empty));
    ///
    /// queue.try_push(10).unwrap();
    /// queue.try_push(20).unwrap();
    /// assert_eq!(queue.try_pop(), Ok(10));
    /// assert_eq!(queue.try_pop(), Ok(20));
    /// ```
    pub fn try_pop(&self) -> Result<T, BCQueueError> {
        let mut guard = self.lock();
        match guard.pop() {
            Ok(value) => {
                drop(guard);
                self.not_full.notify_all();
                Ok(value)
            }
            Err(err) => {
                debug!(capacity = self.capacity, "pop rejected: {}", err);
                Err(err)
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements currently queued.
    pub fn len(&self) -> usize {
        self.lock().meta.occupancy
    }

    pub fn is_empty(&self) -> bool {
        self.lock().meta.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lock().meta.is_full()
    }

    pub fn state(&self) -> BCQueueState {
        self.lock().meta.state()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Copy the queued elements, oldest first, while holding the lock.
    ///
    /// # Examples
    /// ```
    /// use yep_bcq::BCQueue;
    ///
    /// let queue = BCQueue::new(3).unwrap();
    /// for value in [2, 4, 6] {
    ///     queue.try_push(value).unwrap();
    /// }
    /// queue.try_pop().unwrap();
    /// queue.try_push(8).unwrap();
    ///
    /// let snapshot = queue.snapshot();
    /// assert_eq!(snapshot.as_slice(), &[4, 6, 8]);
    /// assert_eq!(snapshot.to_string(), "4 -> 6 -> 8");
    /// ```
    pub fn snapshot(&self) -> BCQueueSnapshot<T>
    where
        T: Clone,
    {
        let guard = self.lock();
        let (head, tail) = guard.meta.occupied_ranges();
        let items = head
            .chain(tail)
            .filter_map(|idx| guard.slots[idx].clone())
            .collect::<Vec<T>>();
        debug_assert_eq!(items.len(), guard.meta.occupancy);

        BCQueueSnapshot::new(items)
    }

    /// Close a shared queue.
    ///
    /// Drops any remaining elements, frees the slot storage and wakes every blocked waiter.
    /// Every later push or pop fails with `BCQueueError::Closed`. Closing twice is a no-op.
    pub fn close(&self) {
        let mut guard = self.lock();
        if guard.closed {
            return;
        }
        guard.closed = true;
        debug!(remaining = guard.meta.occupancy, "closing queue");
        guard.meta.reset();
        let slots = std::mem::take(&mut guard.slots);
        drop(guard);

        // element destructors run outside the lock
        drop(slots);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Tear the queue down once every user has been joined.
    ///
    /// Taking `self` by value means no other thread can still hold a reference. Any
    /// elements still queued are handed back oldest first.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use yep_bcq::BCQueue;
    ///
    /// let queue = Arc::new(BCQueue::new(4).unwrap());
    /// let producer = {
    ///     let queue = Arc::clone(&queue);
    ///     std::thread::spawn(move || queue.try_push(1).unwrap())
    /// };
    /// producer.join().unwrap();
    ///
    /// let queue = Arc::try_unwrap(queue).unwrap();
    /// assert_eq!(queue.destroy(), vec![1]);
    /// ```
    pub fn destroy(self) -> Vec<T> {
        let mut inner = Self::recover(self.inner.into_inner());
        let remaining = inner.drain_fifo();
        debug!(remaining = remaining.len(), "destroyed queue");

        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_push_pop_moves_cursors() {
        let queue = BCQueue::new(4).unwrap();

        queue.try_push(7).unwrap();
        {
            let guard = queue.lock();
            assert_eq!(guard.meta.front, Some(0));
            assert_eq!(guard.meta.back, Some(0));
            assert_eq!(guard.slots[0], Some(7));
        }

        assert_eq!(queue.try_pop(), Ok(7));
        let guard = queue.lock();
        assert_eq!(guard.meta.front, None);
        assert_eq!(guard.meta.back, None);
        assert!(guard.slots.iter().all(Option::is_none));
    }

    #[test]
    fn full_push_leaves_slots_untouched() {
        let queue = BCQueue::new(2).unwrap();
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();

        let err = queue.try_push(3).unwrap_err();
        assert_eq!(err.error, BCQueueError::Full);
        assert_eq!(err.value, 3);

        let guard = queue.lock();
        assert_eq!(guard.slots, vec![Some(1), Some(2)]);
        assert_eq!(guard.meta.occupancy, 2);
    }

    #[test]
    fn close_frees_storage_and_rejects_operations() {
        let queue = BCQueue::new(3).unwrap();
        queue.try_push(1).unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert!(queue.is_empty());
        assert_eq!(queue.lock().slots.capacity(), 0);
        assert_eq!(queue.try_pop(), Err(BCQueueError::Closed));
        assert_eq!(queue.try_push(2).unwrap_err().error, BCQueueError::Closed);

        // second close is a no-op
        queue.close();
        assert!(queue.is_closed());
    }

    #[test]
    fn destroy_drains_wrapped_queue_in_order() {
        let queue = BCQueue::new(3).unwrap();
        for value in 1..=3 {
            queue.try_push(value).unwrap();
        }
        queue.try_pop().unwrap();
        queue.try_push(4).unwrap();

        assert_eq!(queue.destroy(), vec![2, 3, 4]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let queue = BCQueue::new(2).unwrap();
        queue.try_push(1).unwrap();

        std::thread::scope(|s| {
            let result = s
                .spawn(|| {
                    let _guard = queue.lock();
                    panic!("poison the queue lock");
                })
                .join();
            assert!(result.is_err());
        });

        assert!(queue.inner.is_poisoned());
        assert_eq!(queue.len(), 1);

        // the first recovery clears the flag for every later operation
        assert!(!queue.inner.is_poisoned());
        for value in 2..5 {
            queue.try_push(value).unwrap();
            assert_eq!(queue.try_pop(), Ok(value - 1));
            assert!(!queue.inner.is_poisoned());
        }
    }
}
