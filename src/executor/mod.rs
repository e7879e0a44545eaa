//! Executors: where continuations run.
//!
//! An executor accepts a zero-argument unit of [`Work`] and guarantees it
//! eventually runs on a thread of its choosing. Every combinator on
//! [`Eventual`](crate::eventual::Eventual) takes an [`ExecutionPolicy`] that
//! names the executor for its continuation:
//!
//! - [`ExecutionPolicy::Inline`]: runs on the thread that triggered the
//!   continuation (the completing thread, or the registering thread when the
//!   source had already settled).
//! - [`ExecutionPolicy::Pooled`]: hands the work to the shared pool. This is
//!   the default.
//! - [`ExecutionPolicy::Custom`]: any other [`Executor`].
//!
//! # Examples
//!
//! ```rust
//! use futura::executor::{ExecutionPolicy, Executor, InlineExecutor};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let counted = Arc::clone(&counter);
//!
//! let policy = ExecutionPolicy::custom(InlineExecutor);
//! policy.submit(Box::new(move || {
//!     counted.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! assert_eq!(counter.load(Ordering::SeqCst), 1);
//! ```

mod pool;
mod runtime;

pub use pool::{PoolBuilder, PooledExecutor};
pub use runtime::global;

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

/// A unit of work submitted to an executor.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

// =============================================================================
// Executor
// =============================================================================

/// A service that runs submitted work, eventually, on some thread.
///
/// Implementations must run every submitted unit exactly once. They may run
/// it before `submit` returns.
pub trait Executor: Send + Sync {
    /// Submits `work` for execution.
    fn submit(&self, work: Work);
}

impl<X: Executor + ?Sized> Executor for Arc<X> {
    fn submit(&self, work: Work) {
        (**self).submit(work);
    }
}

/// Runs work on the caller's own stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    #[inline]
    fn submit(&self, work: Work) {
        work();
    }
}

/// Runs work on the blocking pool of the runtime behind this handle.
impl Executor for Handle {
    fn submit(&self, work: Work) {
        drop(self.spawn_blocking(work));
    }
}

// =============================================================================
// ExecutionPolicy
// =============================================================================

/// Names the executor a combinator schedules its continuation on.
#[derive(Clone, Default)]
pub enum ExecutionPolicy {
    /// Run on the thread that triggers the continuation.
    Inline,
    /// Run on the shared global pool.
    #[default]
    Pooled,
    /// Run on a caller-supplied executor.
    Custom(Arc<dyn Executor>),
}

impl ExecutionPolicy {
    /// Wraps any executor in a policy.
    pub fn custom<X>(executor: X) -> Self
    where
        X: Executor + 'static,
    {
        Self::Custom(Arc::new(executor))
    }

    /// Returns `true` for [`ExecutionPolicy::Inline`].
    #[inline]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline)
    }
}

impl Executor for ExecutionPolicy {
    fn submit(&self, work: Work) {
        match self {
            Self::Inline => InlineExecutor.submit(work),
            Self::Pooled => PooledExecutor::global().submit(work),
            Self::Custom(executor) => executor.submit(work),
        }
    }
}

impl From<PooledExecutor> for ExecutionPolicy {
    fn from(executor: PooledExecutor) -> Self {
        Self::custom(executor)
    }
}

impl From<Handle> for ExecutionPolicy {
    fn from(handle: Handle) -> Self {
        Self::custom(handle)
    }
}

impl fmt::Debug for ExecutionPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => formatter.write_str("Inline"),
            Self::Pooled => formatter.write_str("Pooled"),
            Self::Custom(_) => formatter.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Counts submissions and runs them inline.
    #[derive(Default)]
    struct CountingExecutor {
        submitted: AtomicUsize,
    }

    impl Executor for CountingExecutor {
        fn submit(&self, work: Work) {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            work();
        }
    }

    #[rstest]
    fn inline_runs_on_calling_thread() {
        let caller = thread::current().id();
        let (sender, receiver) = mpsc::channel();

        ExecutionPolicy::Inline.submit(Box::new(move || {
            sender.send(thread::current().id()).unwrap();
        }));

        assert_eq!(receiver.try_recv().unwrap(), caller);
    }

    #[rstest]
    fn pooled_runs_on_another_thread() {
        let caller = thread::current().id();
        let (sender, receiver) = mpsc::channel();

        ExecutionPolicy::Pooled.submit(Box::new(move || {
            sender.send(thread::current().id()).unwrap();
        }));

        let worker = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(worker, caller);
    }

    #[rstest]
    fn custom_delegates_to_executor() {
        let executor = Arc::new(CountingExecutor::default());
        let policy = ExecutionPolicy::Custom(executor.clone());

        policy.submit(Box::new(|| {}));
        policy.submit(Box::new(|| {}));

        assert_eq!(executor.submitted.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn handle_runs_work_on_its_runtime() {
        let (sender, receiver) = mpsc::channel();
        let policy = ExecutionPolicy::from(global().handle().clone());

        policy.submit(Box::new(move || sender.send(7).unwrap()));

        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[rstest]
    fn default_policy_is_pooled() {
        assert!(matches!(ExecutionPolicy::default(), ExecutionPolicy::Pooled));
        assert!(!ExecutionPolicy::default().is_inline());
        assert!(ExecutionPolicy::Inline.is_inline());
    }

    #[rstest]
    #[case(ExecutionPolicy::Inline, "Inline")]
    #[case(ExecutionPolicy::Pooled, "Pooled")]
    #[case(ExecutionPolicy::custom(InlineExecutor), "Custom")]
    fn policy_debug(#[case] policy: ExecutionPolicy, #[case] expected: &str) {
        assert_eq!(format!("{policy:?}"), expected);
    }
}
