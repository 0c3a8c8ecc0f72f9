use thiserror::Error;

#[derive(Error, Clone, Copy, Eq, PartialEq, Debug)]
pub enum BCQueueError {
    #[error("invalid arguments")]
    InvalidArgs,
    #[error("could not allocate queue storage")]
    AllocationFailed,
    #[error("queue is full")]
    Full,
    #[error("queue is empty")]
    Empty,
    #[error("queue is closed")]
    Closed,
    #[cfg(feature = "blocking")]
    #[error("timed out waiting on the queue")]
    Timeout,
}

/// A rejected push. Carries the value back so the caller can retry or drop it.
#[derive(Error, Eq, PartialEq, Debug)]
#[error("{error}")]
pub struct BCPushError<T> {
    pub error: BCQueueError,
    pub value: T,
}

impl<T> BCPushError<T> {
    pub(crate) fn new(error: BCQueueError, value: T) -> Self {
        BCPushError { error, value }
    }

    pub fn error(&self) -> BCQueueError {
        self.error
    }

    /// Take back the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_error_displays_inner_error() {
        let err = BCPushError::new(BCQueueError::Full, 7);
        assert_eq!(err.to_string(), "queue is full");
        assert_eq!(err.error(), BCQueueError::Full);
        assert_eq!(err.into_inner(), 7);
    }
}
