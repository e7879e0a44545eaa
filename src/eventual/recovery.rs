//! Recovery combinators: intercept failures and substitute values or
//! eventuals.
//!
//! Handlers receive the failure with one wrapper layer removed
//! (see [`Failure::into_cause`]).

use std::error::Error as StdError;

use super::{Eventual, guarded};
use crate::error::{Error, Failure};
use crate::executor::ExecutionPolicy;

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Turns a failure into an outcome computed by `function`.
    ///
    /// `function` runs on the completing thread. Returning `Err` raises a new
    /// failure instead of recovering. Successes pass through untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::error::Error;
    /// use futura::eventual::Eventual;
    ///
    /// let failed: Eventual<i32> = Eventual::failed(Error::msg("offline"));
    /// assert_eq!(failed.recover(|_| Ok(2)).get().unwrap(), 2);
    /// ```
    pub fn recover<F>(&self, function: F) -> Self
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        self.derive(ExecutionPolicy::Inline, move |outcome, target| match outcome {
            Ok(value) => {
                target.complete(value);
            }
            Err(error) => {
                let cause = error.into_cause();
                target.settle(
                    guarded(move || function(cause)).unwrap_or_else(|panic| Err(E::from(panic))),
                );
            }
        })
    }

    /// Replaces a failure with the eventual returned by `function`, run on
    /// `executor`. The result mirrors the replacement's outcome.
    pub fn recover_with<F>(&self, executor: ExecutionPolicy, function: F) -> Self
    where
        F: FnOnce(E) -> Self + Send + 'static,
    {
        self.derive(executor, move |outcome, target| match outcome {
            Ok(value) => {
                target.complete(value);
            }
            Err(error) => {
                let cause = error.into_cause();
                match guarded(move || function(cause)) {
                    Ok(replacement) => replacement.forward(target),
                    Err(panic) => {
                        target.fail(E::from(panic));
                    }
                }
            }
        })
    }

    /// Falls back to the eventual produced by `function` on any failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::error::Error;
    /// use futura::eventual::{Eventual, future};
    /// use futura::executor::ExecutionPolicy;
    ///
    /// let primary: Eventual<i32> = Eventual::failed(Error::msg("primary down"));
    /// let value = primary.fallback_to(ExecutionPolicy::Pooled, || {
    ///     future(ExecutionPolicy::Pooled, || Ok(20))
    /// });
    /// assert_eq!(value.get().unwrap(), 20);
    /// ```
    pub fn fallback_to<F>(&self, executor: ExecutionPolicy, function: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        self.recover_with(executor, move |_| function())
    }

    /// Converts every failure to another error type.
    ///
    /// This is the catch-all counterpart of [`Eventual::map_error`]: no
    /// failure passes through unconverted.
    pub fn map_failure<E2, F>(&self, function: F) -> Eventual<T, E2>
    where
        E2: Failure,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        let target = Eventual::pending();
        let completer = target.clone();
        self.observe(ExecutionPolicy::Inline, move |outcome| {
            let outcome = outcome.or_else(|error| {
                let cause = error.into_cause();
                Err(guarded(move || function(cause)).unwrap_or_else(E2::from))
            });
            completer.settle(outcome);
        });
        target
    }
}

impl<T> Eventual<T, Error>
where
    T: Clone + Send + 'static,
{
    /// Replaces failures of kind `K` with the error built by `function`.
    ///
    /// The failure is unwrapped once before matching. A matching failure is
    /// replaced, and stays a failure; any other failure passes through
    /// exactly as it was.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::error::{Error, FutureError};
    /// use futura::eventual::Eventual;
    /// use std::fmt;
    ///
    /// #[derive(Debug)]
    /// struct Unsupported;
    ///
    /// impl fmt::Display for Unsupported {
    ///     fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
    ///         formatter.write_str("unsupported")
    ///     }
    /// }
    ///
    /// impl std::error::Error for Unsupported {}
    ///
    /// let failed: Eventual<i32> = Eventual::failed(FutureError::Cancelled.into());
    /// let mapped = failed.map_error(|_: &FutureError| Unsupported);
    /// assert!(mapped.get().unwrap_err().is::<Unsupported>());
    /// ```
    pub fn map_error<K, R, F>(&self, function: F) -> Self
    where
        K: StdError + 'static,
        R: StdError + Send + Sync + 'static,
        F: FnOnce(&K) -> R + Send + 'static,
    {
        self.derive(ExecutionPolicy::Inline, move |outcome, target| match outcome {
            Ok(value) => {
                target.complete(value);
            }
            Err(error) => {
                let cause = error.clone().into_cause();
                let replaced = cause.downcast_ref::<K>().map(|kind| {
                    guarded(|| Error::new(function(kind))).unwrap_or_else(Error::from)
                });
                target.fail(replaced.unwrap_or(error));
            }
        })
    }
}
