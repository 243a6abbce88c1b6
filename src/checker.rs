//! Acceptance policies: do we take this attempt's outcome as final success?
//!
//! Two symmetric checks, both plain predicates:
//! - [`ResultChecker`] judges a value the operation returned.
//! - [`ErrorChecker`] judges an error the operation raised; accepting one
//!   turns it into a normal (even succeeded) outcome instead of a fatal
//!   abort.
//!
//! The `Fn*` adapters carry a fixed extra-argument list composed the same way
//! as the executor's: call arguments first, extras after, then the value (or
//! error), history, and attempt number. [`RejectAllErrors`] is the default
//! error policy: its verdict is the constant `false`, so no error is ever
//! acceptable unless a caller opts in.

use crate::args;
use crate::outcome::PollOutcome;
use std::fmt;
use std::sync::Arc;

/// Policy that decides whether a returned value is a terminal success.
pub trait ResultChecker<A, T, E>: Send + Sync {
    /// Judge one returned value.
    fn check(
        &self,
        value: &T,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> bool;
}

/// Policy that decides whether a raised error is acceptable (non-fatal).
pub trait ErrorChecker<A, T, E>: Send + Sync {
    /// Judge one raised error.
    fn check(
        &self,
        error: &E,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> bool;
}

type ResultPredicate<A, T, E> =
    dyn Fn(&[A], &T, &[PollOutcome<T, E>], usize) -> bool + Send + Sync;

type ErrorPredicate<A, T, E> = dyn Fn(&[A], &E, &[PollOutcome<T, E>], usize) -> bool + Send + Sync;

/// [`ResultChecker`] built from a predicate and a fixed extra-argument list.
pub struct FnResultChecker<A, T, E> {
    predicate: Arc<ResultPredicate<A, T, E>>,
    extra: Vec<A>,
}

impl<A, T, E> FnResultChecker<A, T, E> {
    /// Wrap a predicate with no extra arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&[A], &T, &[PollOutcome<T, E>], usize) -> bool + Send + Sync + 'static,
    {
        Self::with_args(predicate, Vec::new())
    }

    /// Wrap a predicate with a fixed, ordered extra-argument list.
    pub fn with_args<F>(predicate: F, extra: Vec<A>) -> Self
    where
        F: Fn(&[A], &T, &[PollOutcome<T, E>], usize) -> bool + Send + Sync + 'static,
    {
        Self { predicate: Arc::new(predicate), extra }
    }
}

impl<A, T, E> Clone for FnResultChecker<A, T, E>
where
    A: Clone,
{
    fn clone(&self) -> Self {
        Self { predicate: self.predicate.clone(), extra: self.extra.clone() }
    }
}

impl<A, T, E> fmt::Debug for FnResultChecker<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResultChecker")
            .field("predicate", &"<predicate>")
            .field("extra_args", &self.extra.len())
            .finish()
    }
}

impl<A, T, E> ResultChecker<A, T, E> for FnResultChecker<A, T, E>
where
    A: Clone + Send + Sync,
    T: Send + Sync,
    E: Send + Sync,
{
    fn check(
        &self,
        value: &T,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> bool {
        (self.predicate)(&args::compose(call_args, &self.extra), value, history, attempt)
    }
}

/// [`ErrorChecker`] built from a predicate and a fixed extra-argument list.
pub struct FnErrorChecker<A, T, E> {
    predicate: Arc<ErrorPredicate<A, T, E>>,
    extra: Vec<A>,
}

impl<A, T, E> FnErrorChecker<A, T, E> {
    /// Wrap a predicate with no extra arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&[A], &E, &[PollOutcome<T, E>], usize) -> bool + Send + Sync + 'static,
    {
        Self::with_args(predicate, Vec::new())
    }

    /// Wrap a predicate with a fixed, ordered extra-argument list.
    pub fn with_args<F>(predicate: F, extra: Vec<A>) -> Self
    where
        F: Fn(&[A], &E, &[PollOutcome<T, E>], usize) -> bool + Send + Sync + 'static,
    {
        Self { predicate: Arc::new(predicate), extra }
    }
}

impl<A, T, E> Clone for FnErrorChecker<A, T, E>
where
    A: Clone,
{
    fn clone(&self) -> Self {
        Self { predicate: self.predicate.clone(), extra: self.extra.clone() }
    }
}

impl<A, T, E> fmt::Debug for FnErrorChecker<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnErrorChecker")
            .field("predicate", &"<predicate>")
            .field("extra_args", &self.extra.len())
            .finish()
    }
}

impl<A, T, E> ErrorChecker<A, T, E> for FnErrorChecker<A, T, E>
where
    A: Clone + Send + Sync,
    T: Send + Sync,
    E: Send + Sync,
{
    fn check(
        &self,
        error: &E,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> bool {
        (self.predicate)(&args::compose(call_args, &self.extra), error, history, attempt)
    }
}

/// Error policy whose verdict is always `false`: nothing is acceptable.
///
/// Configuring this differs from configuring no error checker at all: errors
/// become failed (retryable) outcomes instead of aborting the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllErrors;

impl<A, T, E> ErrorChecker<A, T, E> for RejectAllErrors
where
    A: Send + Sync,
    T: Send + Sync,
    E: Send + Sync,
{
    fn check(
        &self,
        _error: &E,
        _call_args: &[A],
        _history: &[PollOutcome<T, E>],
        _attempt: usize,
    ) -> bool {
        false
    }
}
