#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Stakeout
//!
//! Bounded polling for async Rust: drive an operation until its result is
//! accepted, the attempt budget runs out, or an unrecoverable error aborts the
//! run.
//!
//! ## Features
//!
//! - **Pluggable policies**: the polled operation, the result acceptance check,
//!   and the error acceptance check are all caller-supplied
//! - **Bounded retries** with a fixed inter-attempt delay
//! - **Per-attempt history** handed to every policy, so acceptance can depend
//!   on what previous attempts saw
//! - **Deterministic tests** via injectable sleepers (no real time needed)
//! - **Tower integration** for polling a `Service` until it answers acceptably
//!
//! ## Quick Start
//!
//! ```rust
//! use stakeout::{FnExecutor, FnResultChecker, Poller};
//! use futures::FutureExt;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Ask an imaginary job service for a status until it reports done.
//!     let executor = FnExecutor::new(|args: Vec<String>, _history, attempt| {
//!         async move {
//!             let status = if attempt < 3 { "pending" } else { "done" };
//!             Ok::<_, std::io::Error>(format!("{}: {}", args[0], status))
//!         }
//!         .boxed()
//!     });
//!     let checker = FnResultChecker::new(|_args, status: &String, _history, _attempt| {
//!         status.ends_with("done")
//!     });
//!
//!     let poller = Poller::builder(executor, checker)
//!         .max_attempts(5)
//!         .delay(Duration::from_millis(10))
//!         .build();
//!
//!     let outcome = poller.start_polling(["job-42".to_string()]).await.unwrap();
//!     assert!(outcome.succeeded());
//!     assert_eq!(outcome.attempt(), 3);
//! }
//! ```

mod args;
pub mod checker;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod poller;
pub mod prelude;
pub mod sleeper;
pub mod value;

// Re-exports
pub use checker::{ErrorChecker, FnErrorChecker, FnResultChecker, RejectAllErrors, ResultChecker};
pub use error::PollError;
pub use executor::{FnExecutor, PollExecutor};
pub use outcome::PollOutcome;
pub use poller::{PollLayer, PollService, Poller, PollerBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use value::{PollCount, PollDelay, ValueError};
