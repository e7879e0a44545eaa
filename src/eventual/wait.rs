//! Awaiting an `Eventual` from async code.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::AtomicWaker;

use super::Eventual;
use crate::error::Failure;
use crate::executor::ExecutionPolicy;

/// Future returned by [`Eventual::wait`] and `Eventual::into_future`.
///
/// The first poll of a pending eventual registers an inline observer that
/// wakes the task; later polls only refresh the stored waker.
#[must_use = "futures do nothing unless polled"]
pub struct Wait<T, E> {
    eventual: Eventual<T, E>,
    waker: Option<Arc<AtomicWaker>>,
}

impl<T, E> Future for Wait<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.eventual.peek() {
            return Poll::Ready(outcome);
        }

        if let Some(waker) = &this.waker {
            waker.register(context.waker());
        } else {
            let waker = Arc::new(AtomicWaker::new());
            waker.register(context.waker());
            let notify = Arc::clone(&waker);
            this.eventual
                .observe(ExecutionPolicy::Inline, move |_| notify.wake());
            this.waker = Some(waker);
        }

        // The observer may have fired between the first check and registration.
        this.eventual.peek().map_or(Poll::Pending, Poll::Ready)
    }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Returns a future that resolves to this eventual's outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let eventual: Eventual<i32> = Eventual::succeeded(3);
    /// assert_eq!(eventual.wait().await.unwrap(), 3);
    /// # });
    /// ```
    pub fn wait(&self) -> Wait<T, E> {
        Wait {
            eventual: self.clone(),
            waker: None,
        }
    }
}

impl<T, E> IntoFuture for Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    type Output = Result<T, E>;
    type IntoFuture = Wait<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Wait {
            eventual: self,
            waker: None,
        }
    }
}
