use std::fmt;

/// Point-in-time copy of a queue's contents, oldest element first.
///
/// Produced by [`BCQueue::snapshot`](crate::BCQueue::snapshot). Displays as
/// `a -> b -> c`, or `EMPTY` when nothing was queued.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BCQueueSnapshot<T> {
    items: Vec<T>,
}

impl<T> BCQueueSnapshot<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        BCQueueSnapshot { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for BCQueueSnapshot<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a BCQueueSnapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Display> fmt::Display for BCQueueSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return f.write_str("EMPTY");
        }

        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
