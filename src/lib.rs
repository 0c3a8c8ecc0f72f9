/// the bounded circular queue
pub mod queue;
pub use queue::BCQueue;

/// Blocking push/pop backed by the queue's Mutex and CondVars (optional feature)
#[cfg(feature = "blocking")]
pub mod blocking_queue;

/// cursor bookkeeping for the circular queue
pub mod queue_meta;
pub use queue_meta::BCQueueState;

/// read-only copies of the queue contents
pub mod snapshot;
pub use snapshot::BCQueueSnapshot;

/// the errors
pub mod error;
pub use error::{BCPushError, BCQueueError};

/// logging hooks (optional feature)
pub mod trace;
pub use trace::init_tracing;

/// utils for internal usage
mod utils;
