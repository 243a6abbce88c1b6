//! Error type for the tower polling adapter.
//!
//! The core [`Poller`](crate::Poller) never produces these: it returns the
//! last outcome record whether or not the budget ran out, and propagates an
//! unrecoverable operation error as the raw `E`. A tower `Service`, though,
//! must answer every call with its typed response or an error, so the adapter
//! reshapes budget exhaustion into [`PollError::Exhausted`].

use std::fmt;
use std::sync::Arc;

/// Cap on the failures recorded inside `Exhausted` to avoid unbounded growth.
pub const MAX_POLL_FAILURES: usize = 10;

/// Error produced by [`PollService`](crate::PollService).
#[derive(Debug, Clone)]
pub enum PollError<E> {
    /// The attempt budget ran out before any response was accepted.
    Exhausted {
        /// Attempts performed.
        attempts: usize,
        /// Recovered errors seen along the way, most recent kept, capped at
        /// [`MAX_POLL_FAILURES`]. Rejected responses are counted but not
        /// recorded.
        failures: Arc<Vec<E>>,
    },
    /// The inner service failed with an error the recover predicate refused.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for PollError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts, failures } => {
                let recorded = failures.len();
                let truncated_note = if recorded > 0 && recorded < *attempts {
                    format!(" (recorded last {} errors)", recorded)
                } else {
                    String::new()
                };
                if let Some(last) = failures.last() {
                    write!(
                        f,
                        "poll budget exhausted after {} attempts{}; last error: {}",
                        attempts, truncated_note, last
                    )
                } else {
                    write!(
                        f,
                        "poll budget exhausted after {} attempts; no accepted response",
                        attempts
                    )
                }
            }
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for PollError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Exhausted { failures, .. } => {
                failures.last().map(|e| e as &dyn std::error::Error)
            }
        }
    }
}

impl<E> PollError<E> {
    /// Construct an `Exhausted` variant, keeping only the most recent
    /// `MAX_POLL_FAILURES` failures.
    pub fn exhausted(attempts: usize, failures: Vec<E>) -> Self {
        let trimmed = if failures.len() > MAX_POLL_FAILURES {
            failures.into_iter().rev().take(MAX_POLL_FAILURES).rev().collect()
        } else {
            failures
        };
        PollError::Exhausted { attempts, failures: Arc::new(trimmed) }
    }

    /// Check if this error is due to budget exhaustion.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Check if this error wraps an inner service error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Get the inner error if this is an `Inner` variant.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the inner error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Access the recorded failures for `Exhausted`, if present.
    pub fn failures(&self) -> Option<&[E]> {
        match self {
            Self::Exhausted { failures, .. } => Some(failures.as_slice()),
            _ => None,
        }
    }

    /// Access exhaustion info as (attempts, recorded_failures).
    pub fn exhausted_info(&self) -> Option<(usize, usize)> {
        match self {
            Self::Exhausted { attempts, failures } => Some((*attempts, failures.len())),
            _ => None,
        }
    }
}
