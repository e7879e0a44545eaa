//! Side-effect observers.
//!
//! Observers return the same eventual they were attached to, so they chain
//! without changing the value. A panic inside an observer is logged and
//! otherwise ignored: there is no derived eventual to carry it.

use super::{Eventual, guarded};
use crate::error::Failure;
use crate::executor::ExecutionPolicy;

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Runs `action` with the value once `self` succeeds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    /// use futura::executor::ExecutionPolicy;
    /// use std::sync::mpsc;
    ///
    /// let (sender, receiver) = mpsc::channel();
    /// let eventual: Eventual<i32> = Eventual::succeeded(1);
    /// eventual.on_success(ExecutionPolicy::Inline, move |value| sender.send(value).unwrap());
    /// assert_eq!(receiver.recv().unwrap(), 1);
    /// ```
    pub fn on_success<F>(&self, executor: ExecutionPolicy, action: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.on_complete(executor, |_| {}, action)
    }

    /// Runs `action` with the unwrapped cause once `self` fails.
    pub fn on_failure<F>(&self, executor: ExecutionPolicy, action: F) -> Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.on_complete(executor, action, |_| {})
    }

    /// Runs exactly one of `on_failure` or `on_success`, depending on the
    /// outcome.
    pub fn on_complete<S, F>(&self, executor: ExecutionPolicy, on_failure: F, on_success: S) -> Self
    where
        F: FnOnce(E) + Send + 'static,
        S: FnOnce(T) + Send + 'static,
    {
        self.observe(executor, move |outcome| {
            let tapped = match outcome {
                Ok(value) => guarded(move || on_success(value)),
                Err(error) => {
                    let cause = error.into_cause();
                    guarded(move || on_failure(cause))
                }
            };
            if let Err(error) = tapped {
                tracing::warn!(%error, "eventual observer panicked");
            }
        });
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FutureError};
    use rstest::rstest;
    use std::sync::mpsc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[rstest]
    fn on_success_fires_only_on_success() {
        let (sender, receiver) = mpsc::channel();
        let failure_sender = sender.clone();

        let success: Eventual<i32, FutureError> = Eventual::succeeded(1);
        success.on_success(ExecutionPolicy::Pooled, move |value| sender.send(value).unwrap());

        let failure: Eventual<i32, FutureError> = Eventual::failed(FutureError::Abandoned);
        failure.on_success(ExecutionPolicy::Pooled, move |value| {
            failure_sender.send(value * 100).unwrap();
        });

        assert_eq!(receiver.recv_timeout(TIMEOUT), Ok(1));
        assert!(receiver.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[rstest]
    fn on_failure_receives_unwrapped_cause() {
        let (sender, receiver) = mpsc::channel();
        let failure: Eventual<i32> = Eventual::failed(Error::wrap(Error::msg("root cause")));

        failure.on_failure(ExecutionPolicy::Inline, move |cause| {
            sender.send((cause.is_wrapped(), cause.to_string())).unwrap();
        });

        assert_eq!(
            receiver.recv_timeout(TIMEOUT),
            Ok((false, "root cause".to_string()))
        );
    }

    #[rstest]
    fn on_complete_dispatches_by_outcome() {
        let (sender, receiver) = mpsc::channel();
        let pending: Eventual<i32, FutureError> = Eventual::pending();
        let failure_sender = sender.clone();

        pending.on_complete(
            ExecutionPolicy::Inline,
            move |error| failure_sender.send(Err(error)).unwrap(),
            move |value| sender.send(Ok(value)).unwrap(),
        );
        pending.fail(FutureError::Cancelled);

        assert_eq!(receiver.recv_timeout(TIMEOUT), Ok(Err(FutureError::Cancelled)));
    }

    #[rstest]
    fn observers_return_the_same_eventual() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        let tapped = eventual
            .on_success(ExecutionPolicy::Inline, |_| {})
            .on_failure(ExecutionPolicy::Inline, |_| {});
        assert!(tapped.ptr_eq(&eventual));
    }

    #[rstest]
    fn panicking_observer_does_not_affect_value() {
        let eventual: Eventual<i32, FutureError> = Eventual::pending();
        eventual.on_success(ExecutionPolicy::Inline, |_| panic!("observer panic"));

        assert!(eventual.complete(2));
        assert_eq!(eventual.get(), Ok(2));
    }
}
