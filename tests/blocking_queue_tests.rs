#[cfg(feature = "blocking")]
#[cfg(test)]
mod blocking_queue_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use yep_bcq::{BCQueue, BCQueueError};

    use test_support::utils::{assert_same_multiset, producer_values, spawn_named};

    const DEFAULT_SMALL_TIMEOUT: Duration = Duration::from_millis(1);
    const SETTLE_TIME: Duration = Duration::from_millis(50);

    #[test]
    /**
     * Producers push far more values than the queue holds, relying on blocking push for
     * backpressure while a single consumer drains with blocking pop.
     */
    fn blocking_producers_and_consumer_test() {
        let capacity: usize = 4;
        let num_producers: usize = 4;
        let per_producer: usize = 1000;
        let total = num_producers * per_producer;

        let queue = BCQueue::new(capacity).unwrap();
        let mut received = Vec::with_capacity(total);

        std::thread::scope(|s| {
            for i in 0..num_producers {
                let queue = &queue;
                spawn_named(s, format!("producer_{}", i), move || {
                    for value in producer_values(i, per_producer) {
                        queue.push(value).expect("queue stays open");
                    }
                });
            }

            for _ in 0..total {
                received.push(queue.pop().expect("queue stays open"));
                assert!(queue.len() <= capacity);
            }
        });

        assert!(queue.is_empty());
        assert_same_multiset(
            received,
            (0..num_producers).flat_map(|i| producer_values(i, per_producer)),
        );
    }

    #[test]
    fn blocked_pop_is_woken_by_push_test() {
        let queue = BCQueue::new(2).unwrap();

        std::thread::scope(|s| {
            let consumer = s.spawn(|| queue.pop());

            std::thread::sleep(SETTLE_TIME);
            queue.try_push(42).unwrap();

            assert_eq!(consumer.join().unwrap(), Ok(42));
        });
        assert!(queue.is_empty());
    }

    #[test]
    fn blocked_push_is_woken_by_pop_test() {
        let queue = BCQueue::new(1).unwrap();
        queue.try_push(1).unwrap();

        std::thread::scope(|s| {
            let producer = s.spawn(|| queue.push(2));

            std::thread::sleep(SETTLE_TIME);
            assert_eq!(queue.try_pop(), Ok(1));

            assert!(producer.join().unwrap().is_ok());
        });
        assert_eq!(queue.try_pop(), Ok(2));
    }

    #[test]
    fn close_wakes_blocked_waiters_test() {
        let empty = BCQueue::<u32>::new(1).unwrap();
        let full = BCQueue::new(1).unwrap();
        full.try_push(1u32).unwrap();

        std::thread::scope(|s| {
            let consumer = s.spawn(|| empty.pop());
            let producer = s.spawn(|| full.push(2));

            std::thread::sleep(SETTLE_TIME);
            empty.close();
            full.close();

            assert_eq!(consumer.join().unwrap(), Err(BCQueueError::Closed));
            let err = producer.join().unwrap().unwrap_err();
            assert_eq!(err.error(), BCQueueError::Closed);
            assert_eq!(err.into_inner(), 2);
        });
    }

    #[test]
    fn pop_timeout_waits_roughly_the_timeout_test() {
        let queue = BCQueue::<u8>::new(1).unwrap();
        let timeout = Duration::from_millis(30);

        let start = Instant::now();
        assert_eq!(queue.pop_timeout(timeout), Err(BCQueueError::Timeout));
        assert!(start.elapsed() >= timeout);
    }

    #[test]
    fn push_timeout_waits_roughly_the_timeout_test() {
        let queue = BCQueue::new(1).unwrap();
        queue.try_push(1u8).unwrap();
        let timeout = Duration::from_millis(30);

        let start = Instant::now();
        let err = queue.push_timeout(2, timeout).unwrap_err();
        assert!(start.elapsed() >= timeout);
        assert_eq!(err.error(), BCQueueError::Timeout);
        assert_eq!(queue.snapshot().as_slice(), &[1]);
    }

    #[test]
    fn push_timeout_leaves_content_unchanged_test() {
        let queue = BCQueue::new(2).unwrap();
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();

        let err = queue.push_timeout(3, DEFAULT_SMALL_TIMEOUT).unwrap_err();
        assert_eq!(err.error(), BCQueueError::Timeout);
        assert_eq!(err.into_inner(), 3);
        assert_eq!(queue.snapshot().as_slice(), &[1, 2]);
    }

    #[test]
    fn pop_timeout_succeeds_when_data_arrives_in_time_test() {
        let queue = Arc::new(BCQueue::new(1).unwrap());

        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                queue.push(7).unwrap();
            })
        };

        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), Ok(7));
        producer.join().unwrap();
    }
}
