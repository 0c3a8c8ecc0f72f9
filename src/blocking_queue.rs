use std::{
    sync::{Condvar, MutexGuard},
    time::{Duration, Instant},
};

use crate::queue::BCQueueInner;
use crate::trace::{debug, trace};
use crate::{BCPushError, BCQueue, BCQueueError};

/// Blocking and bounded-wait variants of push and pop.
///
/// Waiters park on one of two condition variables tied to the queue lock: producers wait on
/// `not_full` and are woken by a successful pop, consumers wait on `not_empty` and are woken
/// by a successful push. [`BCQueue::close`] wakes everyone, and a woken waiter then fails with
/// `BCQueueError::Closed`.
impl<T> BCQueue<T> {
    /// Park on `condvar` while `blocked` holds, until the queue closes or `timeout` runs out.
    ///
    /// Returns the re-acquired guard once the caller may proceed.
    fn wait_until<'a>(
        &'a self,
        mut guard: MutexGuard<'a, BCQueueInner<T>>,
        condvar: &Condvar,
        blocked: impl Fn(&BCQueueInner<T>) -> bool,
        timeout: Option<Duration>,
    ) -> Result<MutexGuard<'a, BCQueueInner<T>>, BCQueueError> {
        let start_time = Instant::now();
        while !guard.closed && blocked(&*guard) {
            guard = match timeout {
                None => self.recover_wait(condvar.wait(guard)),
                Some(timeout) => {
                    // Recalculate remaining timeout before each wait
                    let remaining_timeout = match timeout.checked_sub(start_time.elapsed()) {
                        Some(t) if !t.is_zero() => t,
                        _ => return Err(BCQueueError::Timeout),
                    };

                    trace!(?remaining_timeout, "waiting on queue");
                    let (new_guard, _) =
                        self.recover_wait(condvar.wait_timeout(guard, remaining_timeout));
                    new_guard
                }
            };
        }

        Ok(guard)
    }

    fn push_with_timeout(
        &self,
        value: T,
        timeout: Option<Duration>,
    ) -> Result<(), BCPushError<T>> {
        let guard = self.lock();
        let mut guard =
            match self.wait_until(guard, &self.not_full, |inner| inner.meta.is_full(), timeout) {
                Ok(guard) => guard,
                Err(error) => {
                    debug!(capacity = self.capacity(), "push gave up: {}", error);
                    return Err(BCPushError::new(error, value));
                }
            };

        guard.push(value)?;
        drop(guard);
        self.not_empty.notify_all();
        Ok(())
    }

    fn pop_with_timeout(&self, timeout: Option<Duration>) -> Result<T, BCQueueError> {
        let guard = self.lock();
        let mut guard =
            match self.wait_until(guard, &self.not_empty, |inner| inner.meta.is_empty(), timeout) {
                Ok(guard) => guard,
                Err(error) => {
                    debug!(capacity = self.capacity(), "pop gave up: {}", error);
                    return Err(error);
                }
            };

        let value = guard.pop()?;
        drop(guard);
        self.not_full.notify_all();
        Ok(value)
    }

    /// Push `value`, waiting for as long as it takes for a slot to free up.
    ///
    /// # Errors
    /// Returns `BCQueueError::Closed` (with the value) if the queue is closed before or while
    /// waiting.
    ///
    /// # Examples
    /// ```
    /// # #[cfg(feature = "blocking")] {
    /// use yep_bcq::BCQueue;
    ///
    /// let queue = BCQueue::new(1).unwrap();
    /// std::thread::scope(|s| {
    ///     queue.push(1).unwrap();
    ///     s.spawn(|| queue.push(2).unwrap());
    ///     assert_eq!(queue.pop(), Ok(1));
    ///     assert_eq!(queue.pop(), Ok(2));
    /// });
    /// # }
    /// ```
    pub fn push(&self, value: T) -> Result<(), BCPushError<T>> {
        self.push_with_timeout(value, None)
    }

    /// Push `value`, waiting at most `timeout` for a free slot.
    ///
    /// # Arguments
    /// * `value` - The element to append.
    /// * `timeout` - Maximum time to wait for space before giving up with `BCQueueError::Timeout`.
    ///
    /// # Returns
    /// `Ok(())` once the value is stored.
    ///
    /// # Errors
    /// Returns a [`BCPushError`] carrying the value back, with `BCQueueError::Timeout` if the
    /// queue stayed full or `BCQueueError::Closed` if it was closed.
    ///
    /// # Examples
    /// ```
    /// # #[cfg(feature = "blocking")] {
    /// use std::time::Duration;
    /// use yep_bcq::{BCQueue, BCQueueError};
    ///
    /// let queue = BCQueue::new(1).unwrap();
    /// let timeout = Duration::from_millis(1);
    /// queue.push_timeout(1, timeout).unwrap();
    ///
    /// let err = queue.push_timeout(2, timeout).unwrap_err();
    /// assert_eq!(err.error(), BCQueueError::Timeout);
    /// # }
    /// ```
    pub fn push_timeout(&self, value: T, timeout: Duration) -> Result<(), BCPushError<T>> {
        self.push_with_timeout(value, Some(timeout))
    }

    /// Pop the oldest element, waiting for as long as it takes for one to arrive.
    ///
    /// # Errors
    /// Returns `BCQueueError::Closed` if the queue is closed before or while waiting.
    pub fn pop(&self) -> Result<T, BCQueueError> {
        self.pop_with_timeout(None)
    }

    /// Pop the oldest element, waiting at most `timeout` for one to arrive.
    ///
    /// # Arguments
    /// * `timeout` - Maximum time to wait for data before returning `BCQueueError::Timeout`.
    ///
    /// # Returns
    /// `Ok` with the element at the front cursor.
    ///
    /// # Errors
    /// Returns `BCQueueError::Timeout` if the queue stayed empty or `BCQueueError::Closed` if
    /// it was closed.
    ///
    /// # Examples
    /// ```
    /// # #[cfg(feature = "blocking")] {
    /// use std::time::Duration;
    /// use yep_bcq::{BCQueue, BCQueueError};
    ///
    /// let queue = BCQueue::<u32>::new(2).unwrap();
    /// let timeout = Duration::from_millis(1);
    /// assert_eq!(queue.pop_timeout(timeout), Err(BCQueueError::Timeout));
    ///
    /// queue.try_push(5).unwrap();
    /// assert_eq!(queue.pop_timeout(timeout), Ok(5));
    /// # }
    /// ```
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, BCQueueError> {
        self.pop_with_timeout(Some(timeout))
    }
}
