//! Convenient re-exports for common stakeout types.
pub use crate::{
    checker::{ErrorChecker, FnErrorChecker, FnResultChecker, RejectAllErrors, ResultChecker},
    error::{PollError, MAX_POLL_FAILURES},
    executor::{FnExecutor, PollExecutor},
    outcome::PollOutcome,
    poller::{PollLayer, PollService, Poller, PollerBuilder},
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    value::{PollCount, PollDelay, ValueError},
};
