//! Logging for queue lifecycle and contention events.
//!
//! With `--features tracing` the queue reports construction, close/destroy, rejected
//! `try_push`/`try_pop` calls, blocking waits that give up, and poisoned-lock recovery.
//! Without the feature the macros below expand to nothing, so the locked sections stay free
//! of logging calls.

/// Send the queue's events to stderr.
///
/// Filtering follows `RUST_LOG`; when it is unset, `yep_bcq=debug` shows every rejected
/// push/pop and lifecycle event. Each line carries the thread name, so producer and consumer
/// threads spawned with names can be told apart. Calling it again keeps the first subscriber.
/// A no-op unless the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yep_bcq=debug"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// swallows the event, fields and format arguments alike
#[cfg(not(feature = "tracing"))]
macro_rules! discard_event {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use discard_event as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard_event as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard_event as warn;
