//! The operation policy: what each attempt actually runs.
//!
//! Semantics:
//! - The poller calls [`PollExecutor::execute`] once per attempt with the
//!   call-specific arguments, the read-only history of prior outcomes, and the
//!   1-based attempt number.
//! - Whatever the operation returns or raises passes through unchanged; the
//!   executor imposes no constraint beyond `Result<T, E>`.
//! - [`FnExecutor`] adapts a closure plus a fixed list of extra arguments.
//!   Each invocation hands the closure the call arguments followed by the
//!   extras (same extras, same order, every attempt), then history, then the
//!   attempt number.

use crate::args;
use crate::outcome::PollOutcome;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Policy that performs the polled operation.
///
/// Implement this directly when the operation needs to borrow the history
/// across an await; for everything else [`FnExecutor`] is the shorter route.
#[async_trait]
pub trait PollExecutor<A, T, E>: Send + Sync {
    /// Run one attempt.
    async fn execute(
        &self,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> Result<T, E>;
}

type ExecuteFn<A, T, E> =
    dyn Fn(Vec<A>, &[PollOutcome<T, E>], usize) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// [`PollExecutor`] built from a closure and a fixed extra-argument list.
///
/// The closure receives the composed argument sequence (call args first, then
/// the extras captured at construction), the history slice, and the attempt
/// number. It may read the history while building its future but the future
/// itself must be `'static`.
///
/// ```rust
/// use stakeout::FnExecutor;
/// use futures::FutureExt;
///
/// let executor = FnExecutor::with_args(
///     |args: Vec<u32>, _history, _attempt| {
///         async move { Ok::<_, std::io::Error>(args.iter().sum::<u32>()) }.boxed()
///     },
///     vec![30, 12],
/// );
/// # let _ = executor;
/// ```
pub struct FnExecutor<A, T, E> {
    op: Arc<ExecuteFn<A, T, E>>,
    extra: Vec<A>,
}

impl<A, T, E> FnExecutor<A, T, E> {
    /// Wrap an operation with no extra arguments.
    pub fn new<F>(op: F) -> Self
    where
        F: Fn(Vec<A>, &[PollOutcome<T, E>], usize) -> BoxFuture<'static, Result<T, E>>
            + Send
            + Sync
            + 'static,
    {
        Self::with_args(op, Vec::new())
    }

    /// Wrap an operation with a fixed, ordered extra-argument list.
    pub fn with_args<F>(op: F, extra: Vec<A>) -> Self
    where
        F: Fn(Vec<A>, &[PollOutcome<T, E>], usize) -> BoxFuture<'static, Result<T, E>>
            + Send
            + Sync
            + 'static,
    {
        Self { op: Arc::new(op), extra }
    }
}

impl<A, T, E> Clone for FnExecutor<A, T, E>
where
    A: Clone,
{
    fn clone(&self) -> Self {
        Self { op: self.op.clone(), extra: self.extra.clone() }
    }
}

impl<A, T, E> fmt::Debug for FnExecutor<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExecutor")
            .field("op", &"<callable>")
            .field("extra_args", &self.extra.len())
            .finish()
    }
}

#[async_trait]
impl<A, T, E> PollExecutor<A, T, E> for FnExecutor<A, T, E>
where
    A: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    async fn execute(
        &self,
        call_args: &[A],
        history: &[PollOutcome<T, E>],
        attempt: usize,
    ) -> Result<T, E> {
        (self.op)(args::compose(call_args, &self.extra), history, attempt).await
    }
}
