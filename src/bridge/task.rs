//! `Task`: a clonable, awaitable future participating in the bridge.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};

use super::{Completer, Source, Target};
use crate::error::{Error, Failure, FutureError};
use crate::eventual::Eventual;
use crate::executor::{self, ExecutionPolicy, Executor};

/// An async-side future with a shared, clonable outcome.
///
/// Every clone resolves to the same `Result<T, E>`. A task does nothing
/// until it is polled; subscribing to it through the bridge drives it on
/// the global runtime.
///
/// # Examples
///
/// ```rust
/// use futura::bridge::Task;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let task: Task<i32> = Task::new(async { Ok(2) });
/// let clone = task.clone();
/// assert_eq!(task.await.unwrap(), 2);
/// assert_eq!(clone.await.unwrap(), 2);
/// # });
/// ```
#[must_use = "tasks do nothing unless polled"]
pub struct Task<T, E = Error> {
    inner: Shared<BoxFuture<'static, Result<T, E>>>,
}

impl<T, E> Task<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Failure + Sync,
{
    /// Wraps an async computation. A panic while polling it resolves the
    /// task with [`FutureError::Panicked`].
    pub fn new<F>(computation: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let inner = AssertUnwindSafe(computation)
            .catch_unwind()
            .map(|outcome| {
                outcome.unwrap_or_else(|payload| {
                    Err(E::from(FutureError::from_panic(payload.as_ref())))
                })
            })
            .boxed()
            .shared();
        Self { inner }
    }

    /// A task that is already resolved with `outcome`.
    pub fn ready(outcome: Result<T, E>) -> Self {
        Self {
            inner: futures::future::ready(outcome).boxed().shared(),
        }
    }

    /// Returns the outcome if some clone has already driven the task to
    /// completion.
    pub fn peek(&self) -> Option<Result<T, E>> {
        self.inner.peek().cloned()
    }
}

impl<T, E> Clone for Task<T, E>
where
    T: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Future for Task<T, E>
where
    T: Clone,
    E: Clone,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(context)
    }
}

impl<T, E> fmt::Debug for Task<T, E>
where
    T: fmt::Debug + Clone,
    E: fmt::Debug + Clone,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.peek() {
            Some(outcome) => formatter.debug_tuple("Task::Ready").field(outcome).finish(),
            None => formatter.write_str("Task::Pending"),
        }
    }
}

impl<T, E> From<Eventual<T, E>> for Task<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Failure + Sync,
{
    /// Mirrors the eventual's outcome exactly, without unwrapping failures.
    fn from(eventual: Eventual<T, E>) -> Self {
        Self::new(eventual.into_future())
    }
}

impl<T, E> From<Task<T, E>> for Eventual<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Failure + Sync,
{
    /// Drives the task on the global runtime and mirrors its outcome.
    fn from(task: Task<T, E>) -> Self {
        Self::spawn(task)
    }
}

// =============================================================================
// Bridge capabilities
// =============================================================================

impl<T, E> Source<T, E> for Task<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Failure + Sync,
{
    /// Settled tasks report on `executor` straight away. Pending tasks are
    /// awaited on the global runtime; an `Inline` callback is then moved to
    /// the blocking pool so that it never runs on a runtime worker.
    fn subscribe<F>(&self, executor: ExecutionPolicy, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        if let Some(outcome) = self.peek() {
            executor.submit(Box::new(move || callback(outcome)));
            return;
        }

        let executor = if executor.is_inline() {
            ExecutionPolicy::Pooled
        } else {
            executor
        };
        let task = self.clone();
        executor::global().spawn(async move {
            let outcome = task.await;
            executor.submit(Box::new(move || callback(outcome)));
        });
    }
}

/// Settles the [`Task`] it was created with.
///
/// Dropping it without settling resolves the task with
/// [`FutureError::Abandoned`].
pub struct TaskCompleter<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Completer<T, E> for TaskCompleter<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn complete(self, value: T) -> bool {
        self.sender.send(Ok(value)).is_ok()
    }

    fn fail(self, error: E) -> bool {
        self.sender.send(Err(error)).is_ok()
    }
}

impl<T, E> fmt::Debug for TaskCompleter<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TaskCompleter")
            .field("canceled", &self.sender.is_canceled())
            .finish()
    }
}

impl<T, E> Target<T, E> for Task<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Failure + Sync,
{
    type Completer = TaskCompleter<T, E>;

    fn completable() -> (Self, Self::Completer) {
        let (sender, receiver) = oneshot::channel();
        let task = Self::new(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(E::from(FutureError::Abandoned)))
        });
        (task, TaskCompleter { sender })
    }
}
