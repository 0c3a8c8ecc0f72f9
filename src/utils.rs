pub(crate) fn wrap_increment(idx: usize, capacity: usize) -> usize {
    debug_assert!(capacity > 0, "capacity must be non-zero");
    debug_assert!(idx < capacity, "index out of range");
    let next = idx + 1;
    if next == capacity { 0 } else { next }
}
