//! The `Eventual` type: a value that becomes available at most once.
//!
//! An [`Eventual<T, E>`] is pending until it settles, exactly once, as either
//! a success (`Ok(T)`) or a failure (`Err(E)`). It is a cheap, clonable
//! handle; all clones share one completion cell.
//!
//! # Combinators
//!
//! Every combinator returns immediately with a new, possibly pending
//! `Eventual`. Continuations run on the executor named by the
//! [`ExecutionPolicy`] passed in:
//!
//! | Group       | Operations                                                      |
//! |-------------|-----------------------------------------------------------------|
//! | Sequential  | `map`, `try_map`, `flat_map`, `flatten`, `filter`               |
//! | Combination | `zip`, `zip_with`                                               |
//! | Recovery    | `recover`, `recover_with`, `fallback_to`, `map_error`, `map_failure` |
//! | Observation | `on_success`, `on_failure`, `on_complete`                       |
//!
//! Failures pass through every combinator unchanged unless a recovery
//! combinator intercepts them. A panic inside a supplied function is caught
//! and fails the derived `Eventual` with [`FutureError::Panicked`].
//!
//! # Examples
//!
//! ```rust
//! use futura::eventual::Eventual;
//! use futura::executor::ExecutionPolicy::{Inline, Pooled};
//!
//! let user: Eventual<u64> = futura::eventual::future(Pooled, || Ok(7));
//! let posts = user
//!     .map(Pooled, |id| id * 10)
//!     .flat_map(Inline, |count| Eventual::succeeded(count + 1));
//!
//! assert_eq!(posts.get().unwrap(), 71);
//! ```

mod cell;
mod combine;
mod construct;
mod observe;
mod recovery;
mod sequential;
mod wait;

pub use construct::{IntoEventual, IntoFailed, failed, future, immediate, succeeded};
pub use wait::Wait;

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Failure, FutureError};
use crate::executor::ExecutionPolicy;

use cell::Cell;

/// A single-assignment, eventually-resolved value.
///
/// # Type Parameters
///
/// - `T`: the success type. Each observer receives its own clone.
/// - `E`: the failure type, [`Error`] unless stated otherwise.
///
/// # Thread Safety
///
/// `Eventual<T, E>` is `Send + Sync` when `T` and `E` are `Send`. Concurrent
/// completion attempts are resolved by a compare-and-swap on the cell's state:
/// exactly one succeeds, the rest return `false`.
pub struct Eventual<T, E = Error> {
    cell: Arc<Cell<T, E>>,
}

impl<T, E> Clone for Eventual<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Creates a pending eventual, to be settled with [`complete`](Self::complete)
    /// or [`fail`](Self::fail).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    ///
    /// let eventual: Eventual<i32> = Eventual::pending();
    /// assert!(!eventual.is_done());
    /// assert!(eventual.complete(1));
    /// assert_eq!(eventual.get().unwrap(), 1);
    /// ```
    #[must_use]
    pub fn pending() -> Self {
        Self {
            cell: Arc::new(Cell::new()),
        }
    }

    /// Creates an eventual that has already succeeded with `value`.
    #[must_use]
    pub fn succeeded(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// Creates an eventual that has already failed with `error`.
    #[must_use]
    pub fn failed(error: E) -> Self {
        Self::settled(Err(error))
    }

    /// Creates an eventual that has already settled with `outcome`.
    #[must_use]
    pub fn settled(outcome: Result<T, E>) -> Self {
        Self {
            cell: Arc::new(Cell::with_outcome(outcome)),
        }
    }

    /// Settles the eventual as a success.
    ///
    /// Returns `false` and changes nothing if it had already settled.
    pub fn complete(&self, value: T) -> bool {
        self.cell.settle(Ok(value))
    }

    /// Settles the eventual as a failure.
    ///
    /// Returns `false` and changes nothing if it had already settled.
    pub fn fail(&self, error: E) -> bool {
        self.cell.settle(Err(error))
    }

    /// Settles the eventual with `outcome`.
    ///
    /// Returns `false` and changes nothing if it had already settled.
    pub fn settle(&self, outcome: Result<T, E>) -> bool {
        self.cell.settle(outcome)
    }

    /// Fails a pending eventual with [`FutureError::Cancelled`].
    ///
    /// Cancellation is local: sources this eventual was derived from, and
    /// eventuals derived from it, are not cancelled. Returns `false` if the
    /// eventual had already settled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.fail(E::from(FutureError::Cancelled));
        if cancelled {
            tracing::debug!("eventual cancelled");
        }
        cancelled
    }

    /// Returns `true` once the eventual has settled.
    pub fn is_done(&self) -> bool {
        self.cell.is_settled()
    }

    /// Returns the outcome without blocking, or `None` while pending.
    pub fn peek(&self) -> Option<Result<T, E>> {
        self.cell.peek()
    }

    /// Blocks the calling thread until the eventual settles.
    ///
    /// # Errors
    ///
    /// Returns the failure the eventual settled with.
    pub fn get(&self) -> Result<T, E> {
        self.cell.wait()
    }

    /// Blocks for at most `timeout`; `None` means the eventual is still
    /// pending.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub fn get_timeout(&self, timeout: Duration) -> Option<Result<T, E>> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.cell.wait_until(deadline),
            None => Some(self.cell.wait()),
        }
    }

    /// Registers `callback` to receive the outcome, run on `executor`.
    ///
    /// The callback fires exactly once. When the eventual has already
    /// settled it is submitted to `executor` right away.
    pub fn observe<F>(&self, executor: ExecutionPolicy, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.cell.register(executor, Box::new(callback));
    }

    /// Returns `true` if both handles share the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Mirrors this eventual's outcome into `target`.
    pub(crate) fn forward(&self, target: Self) {
        self.observe(ExecutionPolicy::Inline, move |outcome| {
            target.settle(outcome);
        });
    }

    /// Creates a pending eventual and settles it from this one's outcome.
    pub(crate) fn derive<B, F>(&self, executor: ExecutionPolicy, settle: F) -> Eventual<B, E>
    where
        B: Clone + Send + 'static,
        F: FnOnce(Result<T, E>, Eventual<B, E>) + Send + 'static,
    {
        let target = Eventual::pending();
        let completer = target.clone();
        self.observe(executor, move |outcome| settle(outcome, completer));
        target
    }
}

impl<T, E> Default for Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    fn default() -> Self {
        Self::pending()
    }
}

impl<T, E> fmt::Debug for Eventual<T, E>
where
    T: fmt::Debug + Clone + Send + 'static,
    E: fmt::Debug + Failure,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(Ok(value)) => formatter.debug_tuple("Eventual::Succeeded").field(&value).finish(),
            Some(Err(error)) => formatter.debug_tuple("Eventual::Failed").field(&error).finish(),
            None => formatter.write_str("Eventual::Pending"),
        }
    }
}

/// Runs a supplied function, turning a panic into [`FutureError::Panicked`].
pub(crate) fn guarded<R>(function: impl FnOnce() -> R) -> Result<R, FutureError> {
    catch_unwind(AssertUnwindSafe(function)).map_err(|payload| {
        let error = FutureError::from_panic(payload.as_ref());
        tracing::debug!(%error, "captured panic from supplied function");
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::mpsc;
    use std::thread;

    #[rstest]
    fn succeeded_is_done() {
        let eventual: Eventual<i32> = Eventual::succeeded(1);
        assert!(eventual.is_done());
        assert_eq!(eventual.get().unwrap(), 1);
    }

    #[rstest]
    fn failed_is_done() {
        let eventual: Eventual<i32, FutureError> = Eventual::failed(FutureError::Abandoned);
        assert!(eventual.is_done());
        assert_eq!(eventual.get(), Err(FutureError::Abandoned));
    }

    #[rstest]
    fn completion_is_exactly_once() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        assert!(eventual.complete(1));
        assert!(!eventual.complete(2));
        assert!(!eventual.fail(FutureError::Cancelled));
        assert_eq!(eventual.get(), Ok(1));
    }

    #[rstest]
    fn clones_share_the_cell() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        let clone = eventual.clone();
        assert!(eventual.ptr_eq(&clone));

        clone.complete(5);
        assert_eq!(eventual.peek(), Some(Ok(5)));
    }

    #[rstest]
    fn cancel_fails_pending_eventual() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        assert!(eventual.cancel());
        assert_eq!(eventual.get(), Err(FutureError::Cancelled));
    }

    #[rstest]
    fn cancel_after_settle_is_noop() {
        let eventual: Eventual<i32, FutureError> = Eventual::succeeded(1);
        assert!(!eventual.cancel());
        assert_eq!(eventual.get(), Ok(1));
    }

    #[rstest]
    fn get_blocks_until_completed_elsewhere() {
        let eventual: Eventual<&'static str, FutureError> = Eventual::pending();
        let completer = eventual.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete("done");
        });

        assert_eq!(eventual.get(), Ok("done"));
        handle.join().unwrap();
    }

    #[rstest]
    fn get_timeout_returns_none_while_pending() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        assert_eq!(eventual.get_timeout(Duration::from_millis(10)), None);
    }

    #[rstest]
    fn get_timeout_accepts_unbounded_duration() {
        let settled: Eventual<i32, FutureError> = Eventual::succeeded(1);
        assert_eq!(settled.get_timeout(Duration::MAX), Some(Ok(1)));

        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        let completer = eventual.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(2);
        });

        assert_eq!(eventual.get_timeout(Duration::MAX), Some(Ok(2)));
        handle.join().unwrap();
    }

    #[rstest]
    fn observe_after_settle_uses_the_executor() {
        let eventual: Eventual<i32, FutureError> = Eventual::succeeded(3);
        let caller = thread::current().id();
        let (sender, receiver) = mpsc::channel();

        eventual.observe(ExecutionPolicy::Pooled, move |outcome| {
            sender.send((outcome, thread::current().id())).unwrap();
        });

        let (outcome, worker) = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, Ok(3));
        assert_ne!(worker, caller);
    }

    #[rstest]
    fn debug_shows_state() {
        let pending: Eventual<i32, FutureError> = Eventual::pending();
        assert_eq!(format!("{pending:?}"), "Eventual::Pending");

        pending.complete(4);
        assert_eq!(format!("{pending:?}"), "Eventual::Succeeded(4)");

        let failed: Eventual<i32, FutureError> = Eventual::failed(FutureError::Cancelled);
        assert_eq!(format!("{failed:?}"), "Eventual::Failed(Cancelled)");
    }

    #[rstest]
    fn guarded_captures_panics() {
        assert_eq!(guarded(|| 1), Ok(1));
        assert_eq!(
            guarded(|| -> i32 { panic!("nope") }),
            Err(FutureError::Panicked("nope".to_string()))
        );
    }
}
