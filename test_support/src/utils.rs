// Common utilities for tests, benches and demos

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::thread::{Scope, ScopedJoinHandle};
use std::time::Duration;

/// Escalating wait for retry loops: spin, then yield, then sleep.
///
/// `backoff_pow` is advanced on every call; reset it to 0 after a successful operation.
pub fn backoff(backoff_pow: &mut u32) {
    if *backoff_pow < 6 {
        for _ in 0..(1u32 << *backoff_pow) {
            std::hint::spin_loop();
        }
    } else if *backoff_pow < 10 {
        std::thread::yield_now();
    } else {
        std::thread::sleep(Duration::from_micros(50));
    }

    *backoff_pow = (*backoff_pow + 1).min(10);
}

/// Spawn a scoped thread with a name, so panics and tracing output identify the worker.
pub fn spawn_named<'scope, 'env, F, T>(
    s: &'scope Scope<'scope, 'env>,
    name: impl Into<String>,
    f: F,
) -> ScopedJoinHandle<'scope, T>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    let name = name.into();
    std::thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(s, f)
        .unwrap_or_else(|e| panic!("failed to spawn {name}: {e}"))
}

/// Count the occurrences of each value.
pub fn multiset<T, I>(values: I) -> HashMap<T, usize>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Assert two collections hold the same values with the same multiplicities, in any order.
pub fn assert_same_multiset<T, A, B>(actual: A, expected: B)
where
    T: Eq + Hash + Debug,
    A: IntoIterator<Item = T>,
    B: IntoIterator<Item = T>,
{
    let actual = multiset(actual);
    let expected = multiset(expected);

    for (value, count) in &expected {
        let got = actual.get(value).copied().unwrap_or(0);
        assert_eq!(got, *count, "value {value:?} seen {got} times, expected {count}");
    }
    for (value, count) in &actual {
        assert!(
            expected.contains_key(value),
            "unexpected value {value:?} seen {count} times"
        );
    }
}

/// Values pushed by producer number `producer` when every producer pushes `per_producer`
/// items. Disjoint across producers so duplicates and losses are both detectable.
pub fn producer_values(producer: usize, per_producer: usize) -> impl Iterator<Item = u64> {
    let base = (producer * per_producer) as u64;
    (0..per_producer as u64).map(move |i| base + i)
}
