//! Validated scalar configuration for the polling loop.
//!
//! Both values reject bad input when they are constructed, never during a
//! run: a negative count or a negative/non-finite delay fails fast with a
//! [`ValueError`].

use std::time::Duration;

/// Validation failure for a scalar configuration value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Poll counts are unsigned; negative input is rejected.
    #[error("poll count must be zero or greater (got {0})")]
    NegativeCount(i64),
    /// Delays are durations; negative, NaN, or overflowing seconds are rejected.
    #[error("poll delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidDelay(f64),
}

/// Retry budget: the maximum number of attempts in one polling run.
///
/// Defaults to 10. A budget of zero still permits one attempt; the loop
/// tests the bound only after the first attempt has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollCount(usize);

impl PollCount {
    /// Validate a possibly-signed count, e.g. one parsed from external config.
    pub fn new(value: i64) -> Result<Self, ValueError> {
        usize::try_from(value).map(Self).map_err(|_| ValueError::NegativeCount(value))
    }

    /// The budget as a plain integer.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PollCount {
    fn default() -> Self {
        Self(10)
    }
}

impl From<usize> for PollCount {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Inter-attempt delay. Defaults to 10 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollDelay(Duration);

impl PollDelay {
    /// Validate a delay given in seconds, e.g. one parsed from external config.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ValueError> {
        Duration::try_from_secs_f64(secs).map(Self).map_err(|_| ValueError::InvalidDelay(secs))
    }

    /// The delay as a [`Duration`].
    pub fn get(self) -> Duration {
        self.0
    }
}

impl Default for PollDelay {
    fn default() -> Self {
        Self(Duration::from_secs(10))
    }
}

impl From<Duration> for PollDelay {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}
