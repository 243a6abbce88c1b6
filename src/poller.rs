//! The polling orchestrator.
//!
//! Drives bounded attempts against a caller-supplied operation and judges
//! every outcome through caller-supplied acceptance policies.
//!
//! Semantics:
//! - `max_attempts` bounds one run (default 10). The bound is tested only
//!   after an attempt has run, so a budget of zero still polls once.
//! - Each attempt invokes the executor, then exactly one checker: the result
//!   checker for a returned value, the error checker for a raised error.
//! - An error with no error checker configured aborts the run and propagates
//!   unchanged out of [`Poller::start_polling`]. This is the only fatal path;
//!   with a checker configured, the error becomes a normal outcome whose
//!   success is the checker's verdict.
//! - The delay elapses only between a failed attempt and the next one, never
//!   after a successful or final attempt.
//! - `start_polling` returns the record of the most recent attempt whether it
//!   succeeded or the budget ran out; callers inspect
//!   [`succeeded`](crate::PollOutcome::succeeded) to tell the two apart.
//!
//! Invariants:
//! - The attempt number in the returned record equals the number of executor
//!   invocations.
//! - The history handed to attempt `k` holds exactly `k - 1` records, in
//!   attempt order.
//! - Sleeps number exactly `attempts - 1`.
//!
//! Example
//! ```rust
//! use futures::FutureExt;
//! use stakeout::{FnExecutor, FnResultChecker, InstantSleeper, Poller};
//! use std::time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let executor = FnExecutor::new(|_args: Vec<()>, _history, attempt| {
//!     async move { Ok::<_, std::io::Error>(attempt) }.boxed()
//! });
//! let ready = FnResultChecker::new(|_args, value: &usize, _history, _attempt| *value >= 2);
//!
//! let poller = Poller::builder(executor, ready)
//!     .max_attempts(4)
//!     .delay(Duration::from_millis(1))
//!     .with_sleeper(InstantSleeper)
//!     .build();
//!
//! let outcome = poller.start_polling([]).await.unwrap();
//! assert!(outcome.succeeded());
//! assert_eq!(outcome.attempt(), 2);
//! # });
//! ```

use crate::checker::ErrorChecker;
use crate::checker::ResultChecker;
use crate::error::PollError;
use crate::executor::PollExecutor;
use crate::outcome::PollOutcome;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::value::{PollCount, PollDelay};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tower_layer::Layer;
use tower_service::Service;

/// Bounded polling loop around an executor and its acceptance checkers.
///
/// Owns its policies, budget, delay, and sleeper for its whole lifetime; they
/// are supplied once through [`PollerBuilder`] and never replaced. One call to
/// [`start_polling`](Self::start_polling) is one run with its own history.
pub struct Poller<A, T, E> {
    executor: Arc<dyn PollExecutor<A, T, E>>,
    result_checker: Arc<dyn ResultChecker<A, T, E>>,
    error_checker: Option<Arc<dyn ErrorChecker<A, T, E>>>,
    max_attempts: PollCount,
    delay: PollDelay,
    sleeper: Arc<dyn Sleeper>,
}

impl<A, T, E> Clone for Poller<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            result_checker: self.result_checker.clone(),
            error_checker: self.error_checker.clone(),
            max_attempts: self.max_attempts,
            delay: self.delay,
            sleeper: self.sleeper.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for Poller<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("executor", &"<executor>")
            .field("result_checker", &"<predicate>")
            .field("error_checker", &self.error_checker.is_some())
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl<A, T, E> Poller<A, T, E> {
    /// Construct a new builder around the two mandatory policies.
    pub fn builder<X, C>(executor: X, result_checker: C) -> PollerBuilder<A, T, E>
    where
        X: PollExecutor<A, T, E> + 'static,
        C: ResultChecker<A, T, E> + 'static,
    {
        PollerBuilder::new(executor, result_checker)
    }

    /// Inspect the configured attempt budget.
    pub fn max_attempts(&self) -> PollCount {
        self.max_attempts
    }

    /// Inspect the configured inter-attempt delay.
    pub fn delay(&self) -> PollDelay {
        self.delay
    }

    /// Run one polling run with the given call-specific arguments.
    ///
    /// The arguments are flattened into an ordered sequence and handed to
    /// every policy invocation of the run, ahead of each adapter's own
    /// extras. Returns the terminal outcome record, or the raw operation
    /// error when one is raised with no error checker configured.
    pub async fn start_polling<I>(&self, args: I) -> Result<PollOutcome<T, E>, E>
    where
        I: IntoIterator<Item = A>,
    {
        let call_args: Vec<A> = args.into_iter().collect();
        let mut history: Vec<PollOutcome<T, E>> = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.poll_once(&call_args, &history, attempt).await?;
            if outcome.succeeded() || attempt >= self.max_attempts.get() {
                return Ok(outcome);
            }
            tracing::debug!(
                attempt,
                max_attempts = self.max_attempts.get(),
                "poll attempt rejected; sleeping {:?} before the next one",
                self.delay.get()
            );
            history.push(outcome);
            self.sleeper.sleep(self.delay.get()).await;
        }
    }

    /// One attempt: execute, then judge through exactly one checker.
    async fn poll_once(
        &self,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> Result<PollOutcome<T, E>, E> {
        match self.executor.execute(call_args, history, attempt).await {
            Ok(value) => {
                let accepted = self.result_checker.check(&value, call_args, history, attempt);
                Ok(PollOutcome::from_value(value, accepted, attempt))
            }
            Err(error) => {
                let checker = match &self.error_checker {
                    Some(checker) => checker,
                    None => {
                        tracing::debug!(attempt, "unrecoverable poll error; aborting the run");
                        return Err(error);
                    }
                };
                let accepted = checker.check(&error, call_args, history, attempt);
                Ok(PollOutcome::from_error(error, accepted, attempt))
            }
        }
    }
}

/// Builder for [`Poller`].
pub struct PollerBuilder<A, T, E> {
    executor: Arc<dyn PollExecutor<A, T, E>>,
    result_checker: Arc<dyn ResultChecker<A, T, E>>,
    error_checker: Option<Arc<dyn ErrorChecker<A, T, E>>>,
    max_attempts: PollCount,
    delay: PollDelay,
    sleeper: Arc<dyn Sleeper>,
}

impl<A, T, E> PollerBuilder<A, T, E> {
    /// Create a builder with the default budget (10), delay (10 s), no error
    /// checker, and the tokio sleeper.
    pub fn new<X, C>(executor: X, result_checker: C) -> Self
    where
        X: PollExecutor<A, T, E> + 'static,
        C: ResultChecker<A, T, E> + 'static,
    {
        Self {
            executor: Arc::new(executor),
            result_checker: Arc::new(result_checker),
            error_checker: None,
            max_attempts: PollCount::default(),
            delay: PollDelay::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Configure an error checker; without one, any raised error is fatal.
    pub fn error_checker<C>(mut self, checker: C) -> Self
    where
        C: ErrorChecker<A, T, E> + 'static,
    {
        self.error_checker = Some(Arc::new(checker));
        self
    }

    /// Set the attempt budget.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = PollCount::from(attempts);
        self
    }

    /// Set the inter-attempt delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = PollDelay::from(delay);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the poller.
    pub fn build(self) -> Poller<A, T, E> {
        Poller {
            executor: self.executor,
            result_checker: self.result_checker,
            error_checker: self.error_checker,
            max_attempts: self.max_attempts,
            delay: self.delay,
            sleeper: self.sleeper,
        }
    }
}

/// Tower-native polling layer.
///
/// Re-issues the (cloned) request until the accept predicate takes the
/// response. A typed `Service` cannot hand back a rejected response as its
/// success value, so budget exhaustion surfaces as
/// [`PollError::Exhausted`]; an inner error the recover predicate refuses
/// surfaces immediately as [`PollError::Inner`]. The recover predicate
/// defaults to refusing everything.
pub struct PollLayer<Res, E> {
    max_attempts: PollCount,
    delay: PollDelay,
    accept: Arc<dyn Fn(&Res) -> bool + Send + Sync>,
    recover: Arc<dyn Fn(&E) -> bool + Send + Sync>,
    sleeper: Arc<dyn Sleeper>,
}

impl<Res, E> PollLayer<Res, E> {
    /// Create a layer from a response-acceptance predicate, with the default
    /// budget (10), delay (10 s), and tokio sleeper.
    pub fn new<F>(accept: F) -> Self
    where
        F: Fn(&Res) -> bool + Send + Sync + 'static,
    {
        Self {
            max_attempts: PollCount::default(),
            delay: PollDelay::default(),
            accept: Arc::new(accept),
            recover: Arc::new(|_| false),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Set the attempt budget.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = PollCount::from(attempts);
        self
    }

    /// Set the inter-attempt delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = PollDelay::from(delay);
        self
    }

    /// Predicate deciding whether an inner error is recoverable (retried)
    /// rather than fatal.
    pub fn recover_errors<F>(mut self, recover: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.recover = Arc::new(recover);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }
}

impl<Res, E> Clone for PollLayer<Res, E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            delay: self.delay,
            accept: self.accept.clone(),
            recover: self.recover.clone(),
            sleeper: self.sleeper.clone(),
        }
    }
}

impl<Res, E> fmt::Debug for PollLayer<Res, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollLayer")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("accept", &"<predicate>")
            .field("recover", &"<predicate>")
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

/// Polling service produced by [`PollLayer`].
pub struct PollService<S, Res, E> {
    inner: S,
    layer: PollLayer<Res, E>,
}

impl<S: Clone, Res, E> Clone for PollService<S, Res, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), layer: self.layer.clone() }
    }
}

impl<S, Res, E, Request> Service<Request> for PollService<S, Res, E>
where
    Request: Clone + Send + 'static,
    S: Service<Request, Response = Res> + Clone + Send + 'static,
    Res: Send + 'static,
    S::Error: Into<E>,
    S::Future: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Response = Res;
    type Error = PollError<E>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(|e| PollError::Inner(e.into()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let layer = self.layer.clone();
        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut failures: Vec<E> = Vec::new();
            let mut attempt = 0;
            loop {
                attempt += 1;
                match inner.call(req.clone()).await {
                    Ok(resp) if (layer.accept)(&resp) => return Ok(resp),
                    // A rejected response counts as a failed attempt
                    Ok(_) => {}
                    Err(err) => {
                        let e: E = err.into();
                        if !(layer.recover)(&e) {
                            return Err(PollError::Inner(e));
                        }
                        failures.push(e);
                    }
                }
                if attempt >= layer.max_attempts.get() {
                    return Err(PollError::exhausted(attempt, failures));
                }
                layer.sleeper.sleep(layer.delay.get()).await;
            }
        })
    }
}

impl<S, Res, E> Layer<S> for PollLayer<Res, E> {
    type Service = PollService<S, Res, E>;

    fn layer(&self, inner: S) -> Self::Service {
        PollService { inner, layer: self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{FnErrorChecker, FnResultChecker, RejectAllErrors};
    use crate::executor::FnExecutor;
    use crate::sleeper::{InstantSleeper, TrackingSleeper};
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestError(String);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "TestError: {}", self.0)
        }
    }

    impl std::error::Error for TestError {}

    fn ok_string(value: &str) -> Result<String, TestError> {
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(move |_args: Vec<String>, _history, _attempt| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { ok_string("OK") }.boxed()
        });
        let checker =
            FnResultChecker::new(|_args, value: &String, _history, _attempt| value == "OK");

        let poller = Poller::builder(executor, checker)
            .max_attempts(3)
            .delay(Duration::from_millis(10))
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "should only execute once");
        assert_eq!(sleeper.count(), 0, "no sleep after a successful attempt");
    }

    #[tokio::test]
    async fn succeeds_after_retries_and_sleeps_between_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(move |_args: Vec<String>, _history, attempt| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { ok_string(if attempt == 3 { "OK" } else { "NOK" }) }.boxed()
        });
        let checker =
            FnResultChecker::new(|_args, value: &String, _history, _attempt| value == "OK");

        let poller = Poller::builder(executor, checker)
            .max_attempts(5)
            .delay(Duration::from_millis(25))
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 3);
        assert_eq!(outcome.output(), Some(&"OK".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.count(), 2, "sleeps only between failed attempts");
        assert_eq!(sleeper.call_at(0), Some(Duration::from_millis(25)));
        assert_eq!(sleeper.call_at(1), Some(Duration::from_millis(25)));
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_the_last_outcome() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = executor_calls.clone();
        let sleeper = TrackingSleeper::new();

        // Would succeed on attempt 3, but the budget is 2.
        let executor = FnExecutor::with_args(
            move |args: Vec<String>, _history, attempt| {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(n, attempt);
                assert_eq!(args, ["pollArg1", "alpha", "beta"]);
                async move { ok_string(if attempt == 3 { "OK" } else { "NOK" }) }.boxed()
            },
            vec!["alpha".to_string(), "beta".to_string()],
        );
        let checker = FnResultChecker::new(|args: &[String], value: &String, _history, _attempt| {
            assert_eq!(args, ["pollArg1"]);
            value == "OK"
        });

        let poller = Poller::builder(executor, checker)
            .max_attempts(2)
            .delay(Duration::from_millis(5))
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling(["pollArg1".to_string()]).await.unwrap();
        assert!(outcome.failed());
        assert!(!outcome.succeeded());
        assert_eq!(outcome.attempt(), 2);
        assert_eq!(outcome.output(), Some(&"NOK".to_string()));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.count(), 1, "no sleep after the final attempt");
    }

    #[tokio::test]
    async fn extras_on_both_wrappers_are_delivered_in_order() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let checker_calls = Arc::new(AtomicUsize::new(0));
        let executor_calls_clone = executor_calls.clone();
        let checker_calls_clone = checker_calls.clone();

        let executor = FnExecutor::with_args(
            move |args: Vec<String>, _history, attempt| {
                let n = executor_calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(n, attempt);
                assert_eq!(args, ["pollArg1", "text", "12.9"]);
                async move { ok_string(if attempt == 3 { "OK" } else { "NOK" }) }.boxed()
            },
            vec!["text".to_string(), "12.9".to_string()],
        );
        let checker = FnResultChecker::with_args(
            move |args: &[String], value: &String, _history, attempt| {
                let n = checker_calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(n, attempt);
                assert_eq!(args, ["pollArg1", "1", "true"]);
                value == "OK"
            },
            vec!["1".to_string(), "true".to_string()],
        );

        let poller =
            Poller::builder(executor, checker).with_sleeper(InstantSleeper).build();

        let outcome = poller.start_polling(["pollArg1".to_string()]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 3);
        assert_eq!(outcome.output(), Some(&"OK".to_string()));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 3);
        assert_eq!(checker_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn error_without_checker_aborts_the_run() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let checker_calls = Arc::new(AtomicUsize::new(0));
        let executor_calls_clone = executor_calls.clone();
        let checker_calls_clone = checker_calls.clone();
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(move |_args: Vec<String>, history, attempt| {
            executor_calls_clone.fetch_add(1, Ordering::SeqCst);
            assert_eq!(history.len(), attempt - 1);
            async move { Err::<String, _>(TestError("NOK".to_string())) }.boxed()
        });
        let checker = FnResultChecker::new(move |_args, value: &String, _history, _attempt| {
            checker_calls_clone.fetch_add(1, Ordering::SeqCst);
            value == "OK"
        });

        let poller = Poller::builder(executor, checker)
            .max_attempts(5)
            .with_sleeper(sleeper.clone())
            .build();

        let err = poller.start_polling(["pollArg1".to_string()]).await.unwrap_err();
        assert_eq!(err, TestError("NOK".to_string()));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 1, "no further attempts");
        assert_eq!(checker_calls.load(Ordering::SeqCst), 0);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn rejected_errors_keep_the_run_alive() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let result_checker_calls = Arc::new(AtomicUsize::new(0));
        let error_checker_calls = Arc::new(AtomicUsize::new(0));
        let executor_calls_clone = executor_calls.clone();
        let result_checker_calls_clone = result_checker_calls.clone();
        let error_checker_calls_clone = error_checker_calls.clone();
        let sleeper = TrackingSleeper::new();

        // Raises on attempts 2 and 4, succeeds on attempt 5.
        let executor = FnExecutor::new(move |args: Vec<String>, _history, attempt| {
            executor_calls_clone.fetch_add(1, Ordering::SeqCst);
            assert_eq!(args, ["Polling is nice"]);
            async move {
                if attempt == 2 || attempt == 4 {
                    return Err(TestError("not yet".to_string()));
                }
                ok_string(if attempt == 5 { "OK" } else { "NOK" })
            }
            .boxed()
        });
        let result_checker =
            FnResultChecker::new(move |args: &[String], value: &String, _history, _attempt| {
                result_checker_calls_clone.fetch_add(1, Ordering::SeqCst);
                assert_eq!(args, ["Polling is nice"]);
                value == "OK"
            });
        let error_checker = FnErrorChecker::with_args(
            move |args: &[String], _error: &TestError, _history, attempt| {
                let n = error_checker_calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(args, ["Polling is nice", "yes", "no", "text", "2"]);
                assert_eq!(attempt, n * 2);
                false
            },
            vec!["yes".to_string(), "no".to_string(), "text".to_string(), "2".to_string()],
        );

        let poller = Poller::builder(executor, result_checker)
            .error_checker(error_checker)
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling(["Polling is nice".to_string()]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 5);
        assert_eq!(outcome.output(), Some(&"OK".to_string()));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 5);
        assert_eq!(result_checker_calls.load(Ordering::SeqCst), 3);
        assert_eq!(error_checker_calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.count(), 4);
    }

    #[tokio::test]
    async fn accepted_error_is_a_success_carrying_the_error() {
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(|_args: Vec<String>, _history, _attempt| {
            async move { Err::<String, _>(TestError("boom".to_string())) }.boxed()
        });
        let result_checker =
            FnResultChecker::new(|_args, _value: &String, _history, _attempt| false);
        let error_checker =
            FnErrorChecker::new(|_args, error: &TestError, _history, _attempt| error.0 == "boom");

        let poller = Poller::builder(executor, result_checker)
            .error_checker(error_checker)
            .max_attempts(5)
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 1);
        assert_eq!(outcome.error(), Some(&TestError("boom".to_string())));
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn reject_all_errors_retries_until_the_budget_runs_out() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = executor_calls.clone();
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(move |_args: Vec<String>, _history, _attempt| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { Err::<String, _>(TestError("still down".to_string())) }.boxed()
        });
        let checker = FnResultChecker::new(|_args, _value: &String, _history, _attempt| true);

        let poller = Poller::builder(executor, checker)
            .error_checker(RejectAllErrors)
            .max_attempts(3)
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.failed());
        assert_eq!(outcome.attempt(), 3);
        assert_eq!(outcome.error(), Some(&TestError("still down".to_string())));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.count(), 2);
    }

    #[tokio::test]
    async fn zero_budget_still_polls_once() {
        let executor_calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = executor_calls.clone();
        let sleeper = TrackingSleeper::new();

        let executor = FnExecutor::new(move |_args: Vec<String>, _history, _attempt| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { ok_string("NOK") }.boxed()
        });
        let checker =
            FnResultChecker::new(|_args, value: &String, _history, _attempt| value == "OK");

        let poller = Poller::builder(executor, checker)
            .max_attempts(0)
            .with_sleeper(sleeper.clone())
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.failed());
        assert_eq!(outcome.attempt(), 1);
        assert_eq!(executor_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn history_holds_prior_outcomes_in_attempt_order() {
        let executor = FnExecutor::new(|_args: Vec<String>, history, attempt| {
            assert_eq!(history.len(), attempt - 1);
            for (index, record) in history.iter().enumerate() {
                assert_eq!(record.attempt(), index + 1);
                assert!(record.failed());
                assert_eq!(record.output(), Some(&format!("NOK{}", index + 1)));
            }
            async move {
                ok_string(&if attempt == 4 { "OK".to_string() } else { format!("NOK{}", attempt) })
            }
            .boxed()
        });
        let checker = FnResultChecker::new(|_args, value: &String, history, attempt| {
            assert_eq!(history.len(), attempt - 1);
            value == "OK"
        });

        let poller = Poller::builder(executor, checker)
            .max_attempts(6)
            .with_sleeper(InstantSleeper)
            .build();

        let outcome = poller.start_polling([]).await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempt(), 4);
    }

    #[tokio::test]
    async fn builder_defaults_match_the_documented_values() {
        let executor = FnExecutor::new(|_args: Vec<()>, _history, _attempt| {
            async move { Ok::<_, TestError>(()) }.boxed()
        });
        let checker = FnResultChecker::new(|_args: &[()], _value: &(), _history, _attempt| true);

        let poller = Poller::builder(executor, checker).build();
        assert_eq!(poller.max_attempts().get(), 10);
        assert_eq!(poller.delay().get(), Duration::from_secs(10));

        let rendered = format!("{:?}", poller);
        assert!(rendered.contains("Poller"));
        assert!(rendered.contains("<predicate>"));

        let cloned = poller.clone();
        let outcome = cloned.start_polling([]).await.unwrap();
        assert!(outcome.succeeded());
    }
}
