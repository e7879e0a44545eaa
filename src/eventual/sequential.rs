//! Sequential combinators: `map`, `try_map`, `flat_map`, `flatten`, `filter`.

use super::{Eventual, guarded};
use crate::error::{Failure, FutureError};
use crate::executor::ExecutionPolicy;

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Transforms the success value with `function`, run on `executor`.
    ///
    /// A failure of `self` passes through unchanged and `function` is never
    /// called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    /// use futura::executor::ExecutionPolicy;
    ///
    /// let length = Eventual::<&str>::succeeded("four").map(ExecutionPolicy::Pooled, str::len);
    /// assert_eq!(length.get().unwrap(), 4);
    /// ```
    pub fn map<B, F>(&self, executor: ExecutionPolicy, function: F) -> Eventual<B, E>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> B + Send + 'static,
    {
        self.derive(executor, move |outcome, target| match outcome {
            Ok(value) => {
                target.settle(guarded(move || function(value)).map_err(E::from));
            }
            Err(error) => {
                target.fail(error);
            }
        })
    }

    /// Like [`map`](Self::map), but `function` may fail: an `Err` it returns
    /// becomes the failure of the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::error::Error;
    /// use futura::eventual::Eventual;
    /// use futura::executor::ExecutionPolicy;
    ///
    /// let parsed = Eventual::<&str>::succeeded("x1")
    ///     .try_map(ExecutionPolicy::Inline, |text| text.parse::<i32>().map_err(Error::new));
    /// assert!(parsed.get().is_err());
    /// ```
    pub fn try_map<B, F>(&self, executor: ExecutionPolicy, function: F) -> Eventual<B, E>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> Result<B, E> + Send + 'static,
    {
        self.derive(executor, move |outcome, target| match outcome {
            Ok(value) => {
                target.settle(
                    guarded(move || function(value)).unwrap_or_else(|panic| Err(E::from(panic))),
                );
            }
            Err(error) => {
                target.fail(error);
            }
        })
    }

    /// Chains a dependent asynchronous step.
    ///
    /// `function` runs on `executor` with the success value and returns the
    /// next eventual; the result mirrors that eventual's outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::{Eventual, future};
    /// use futura::executor::ExecutionPolicy;
    ///
    /// let user: Eventual<u64> = Eventual::succeeded(1);
    /// let posts = user.flat_map(ExecutionPolicy::Pooled, |id| {
    ///     future(ExecutionPolicy::Pooled, move || Ok(vec![id * 100, id * 100 + 1]))
    /// });
    /// assert_eq!(posts.get().unwrap(), vec![100, 101]);
    /// ```
    pub fn flat_map<B, F>(&self, executor: ExecutionPolicy, function: F) -> Eventual<B, E>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> Eventual<B, E> + Send + 'static,
    {
        self.derive(executor, move |outcome, target| match outcome {
            Ok(value) => match guarded(move || function(value)) {
                Ok(next) => next.forward(target),
                Err(panic) => {
                    target.fail(E::from(panic));
                }
            },
            Err(error) => {
                target.fail(error);
            }
        })
    }

    /// Keeps the success value if `predicate` holds; otherwise fails with
    /// [`FutureError::PredicateNotSatisfied`].
    ///
    /// The predicate is not evaluated when `self` fails.
    pub fn filter<P>(&self, executor: ExecutionPolicy, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool + Send + 'static,
    {
        self.derive(executor, move |outcome, target| {
            let outcome = outcome.and_then(|value| match guarded(|| predicate(&value)) {
                Ok(true) => Ok(value),
                Ok(false) => Err(E::from(FutureError::PredicateNotSatisfied)),
                Err(panic) => Err(E::from(panic)),
            });
            target.settle(outcome);
        })
    }
}

impl<T, E> Eventual<Eventual<T, E>, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Collapses an eventual of an eventual into one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    ///
    /// let nested: Eventual<Eventual<i32>> = Eventual::succeeded(Eventual::succeeded(1));
    /// assert_eq!(nested.flatten().get().unwrap(), 1);
    /// ```
    pub fn flatten(&self) -> Eventual<T, E> {
        self.flat_map(ExecutionPolicy::Inline, |inner| inner)
    }
}
