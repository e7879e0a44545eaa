//! Constructing eventuals from computations, values and async code.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::{Eventual, guarded};
use crate::error::{Failure, FutureError};
use crate::executor::{self, ExecutionPolicy, Executor};

/// Runs `block` on `executor` and settles the returned eventual with its
/// result.
///
/// A panic inside `block` fails the eventual with [`FutureError::Panicked`].
///
/// # Examples
///
/// ```rust
/// use futura::eventual::{Eventual, future};
/// use futura::executor::ExecutionPolicy;
///
/// let answer: Eventual<i32> = future(ExecutionPolicy::Pooled, || Ok(6 * 7));
/// assert_eq!(answer.get().unwrap(), 42);
/// ```
pub fn future<T, E, F>(executor: ExecutionPolicy, block: F) -> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let eventual = Eventual::pending();
    let completer = eventual.clone();
    executor.submit(Box::new(move || {
        completer.settle(guarded(block).unwrap_or_else(|panic| Err(E::from(panic))));
    }));
    eventual
}

/// Runs `block` on the calling thread; the result is settled before this
/// returns.
pub fn immediate<T, E, F>(block: F) -> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    future(ExecutionPolicy::Inline, block)
}

/// An eventual that has already succeeded. No work is scheduled.
pub fn succeeded<T, E>(value: T) -> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    Eventual::succeeded(value)
}

/// An eventual that has already failed. No work is scheduled.
pub fn failed<T, E>(error: E) -> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    Eventual::failed(error)
}

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Drives an async computation on the global runtime and settles with its
    /// output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    ///
    /// let eventual: Eventual<i32> = Eventual::spawn(async { Ok(5) });
    /// assert_eq!(eventual.get().unwrap(), 5);
    /// ```
    pub fn spawn<F>(computation: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let eventual = Self::pending();
        let completer = eventual.clone();
        executor::global().spawn(async move {
            let outcome = AssertUnwindSafe(computation)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(E::from(FutureError::from_panic(payload.as_ref())))
                });
            completer.settle(outcome);
        });
        eventual
    }
}

// =============================================================================
// Extension traits
// =============================================================================

/// Lifts any value into an already-succeeded eventual.
///
/// # Examples
///
/// ```rust
/// use futura::eventual::{Eventual, IntoEventual};
///
/// let eventual: Eventual<&str> = "ready".into_eventual();
/// assert_eq!(eventual.get().unwrap(), "ready");
/// ```
pub trait IntoEventual: Clone + Send + 'static {
    /// Wraps `self` in a succeeded eventual.
    fn into_eventual<E: Failure>(self) -> Eventual<Self, E> {
        Eventual::succeeded(self)
    }
}

impl<T: Clone + Send + 'static> IntoEventual for T {}

/// Lifts a failure into an already-failed eventual.
///
/// # Examples
///
/// ```rust
/// use futura::error::FutureError;
/// use futura::eventual::{Eventual, IntoFailed};
///
/// let eventual: Eventual<i32, FutureError> = FutureError::Cancelled.into_failed();
/// assert_eq!(eventual.get(), Err(FutureError::Cancelled));
/// ```
pub trait IntoFailed: Failure {
    /// Wraps `self` in a failed eventual.
    fn into_failed<T: Clone + Send + 'static>(self) -> Eventual<T, Self> {
        Eventual::failed(self)
    }
}

impl<E: Failure> IntoFailed for E {}
