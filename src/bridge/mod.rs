//! One-way forwarding between future implementations.
//!
//! Any future type can take part by implementing a small set of
//! capabilities:
//!
//! - [`Source`]: "register an outcome observer".
//! - [`Target`]: "create an empty completable future", handing back the
//!   future and its [`Completer`].
//!
//! [`adapt`] is written once against those traits. [`Eventual`] and
//! [`Task`] implement both sides, so either can be adapted into the other.
//!
//! # Examples
//!
//! ```rust
//! use futura::bridge::{self, Task};
//! use futura::eventual::Eventual;
//! use futura::executor::ExecutionPolicy;
//!
//! let eventual: Eventual<i32> = Eventual::succeeded(4);
//! let task: Task<i32> = bridge::adapt(&eventual, ExecutionPolicy::Inline);
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! assert_eq!(task.await.unwrap(), 4);
//! # });
//! ```

mod task;

pub use task::{Task, TaskCompleter};

use crate::error::Failure;
use crate::eventual::Eventual;
use crate::executor::ExecutionPolicy;

/// A future whose outcome can be observed with a callback.
pub trait Source<T, E> {
    /// Calls `callback` with the outcome, on `executor`, once it is known.
    fn subscribe<F>(&self, executor: ExecutionPolicy, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static;
}

/// The writing half of a [`Target`].
pub trait Completer<T, E>: Send + 'static {
    /// Settles the target as a success. Returns `false` if it could not be
    /// settled.
    fn complete(self, value: T) -> bool;

    /// Settles the target as a failure. Returns `false` if it could not be
    /// settled.
    fn fail(self, error: E) -> bool;
}

/// A future that can be created empty and settled later.
pub trait Target<T, E>: Sized {
    /// Handle used to settle the created future.
    type Completer: Completer<T, E>;

    /// Creates an unsettled future together with its completer.
    fn completable() -> (Self, Self::Completer);
}

/// Forwards the outcome of `source` into a new target future.
///
/// The callback runs on `executor`. Failures are forwarded with one wrapper
/// layer removed, see [`Failure::into_cause`].
pub fn adapt<S, D, T, E>(source: &S, executor: ExecutionPolicy) -> D
where
    S: Source<T, E>,
    D: Target<T, E>,
    E: Failure,
{
    let (target, completer) = D::completable();
    source.subscribe(executor, move |outcome| {
        match outcome {
            Ok(value) => completer.complete(value),
            Err(error) => completer.fail(error.into_cause()),
        };
    });
    target
}

impl<T, E> Source<T, E> for Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    fn subscribe<F>(&self, executor: ExecutionPolicy, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.observe(executor, callback);
    }
}

impl<T, E> Completer<T, E> for Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    fn complete(self, value: T) -> bool {
        Self::settle(&self, Ok(value))
    }

    fn fail(self, error: E) -> bool {
        Self::settle(&self, Err(error))
    }
}

impl<T, E> Target<T, E> for Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    type Completer = Self;

    fn completable() -> (Self, Self::Completer) {
        let eventual = Self::default();
        (eventual.clone(), eventual)
    }
}
