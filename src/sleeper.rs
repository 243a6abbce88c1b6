//! The loop's only suspension point, behind a seam.
//!
//! The poller never calls `tokio::time::sleep` directly; it goes through a
//! [`Sleeper`] so tests can swap in [`InstantSleeper`] (no waiting) or
//! [`TrackingSleeper`] (records every requested delay, which is how the
//! no-sleep-after-the-final-attempt behavior gets asserted).

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Abstraction for suspending between attempts.
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Suspend the current task for `duration`.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test sleeper that resolves immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async {})
    }
}

/// Test sleeper that records every requested delay without waiting.
#[derive(Debug, Clone)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Number of sleeps requested so far.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The duration of the `index`-th sleep, if it happened.
    pub fn call_at(&self, index: usize) -> Option<Duration> {
        self.calls.lock().unwrap().get(index).copied()
    }

    /// All requested delays, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for TrackingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        self.calls.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
