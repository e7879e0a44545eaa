//! Pooled execution on a tokio blocking pool.
//!
//! [`PooledExecutor`] hands each unit of work to `spawn_blocking`, so work may
//! block (sleep, wait on another eventual) without stalling async workers.
//!
//! # Examples
//!
//! ```rust
//! use futura::executor::{Executor, PooledExecutor};
//! use std::sync::mpsc;
//!
//! let pool = PooledExecutor::builder()
//!     .worker_threads(2)
//!     .thread_name("fetchers")
//!     .build()
//!     .unwrap();
//!
//! let (sender, receiver) = mpsc::channel();
//! pool.submit(Box::new(move || sender.send(42).unwrap()));
//! assert_eq!(receiver.recv().unwrap(), 42);
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use super::runtime::{self, THREAD_NAME};
use super::{Executor, Work};

// =============================================================================
// PooledExecutor
// =============================================================================

/// Runs work on a shared pool of threads.
///
/// `PooledExecutor::global()` uses the process-wide runtime; executors built
/// with [`PooledExecutor::builder`] own a private runtime that is shut down in
/// the background once the last clone is dropped.
#[derive(Clone)]
pub struct PooledExecutor {
    pool: Pool,
}

#[derive(Clone)]
enum Pool {
    Global,
    Owned(Arc<OwnedRuntime>),
}

/// A private runtime that never blocks when dropped.
///
/// The last clone of a pooled executor may be dropped on one of the pool's
/// own threads, where a joining shutdown would wait on itself.
struct OwnedRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl PooledExecutor {
    /// Returns an executor backed by the global runtime.
    #[must_use]
    pub const fn global() -> Self {
        Self { pool: Pool::Global }
    }

    /// Starts configuring a private pool.
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    fn handle(&self) -> &Handle {
        match &self.pool {
            Pool::Global => runtime::global().handle(),
            Pool::Owned(owned) => &owned.handle,
        }
    }
}

impl Default for PooledExecutor {
    fn default() -> Self {
        Self::global()
    }
}

impl Executor for PooledExecutor {
    fn submit(&self, work: Work) {
        // Detached: the outcome travels through the work itself.
        drop(self.handle().spawn_blocking(work));
    }
}

impl fmt::Debug for PooledExecutor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pool {
            Pool::Global => formatter.write_str("PooledExecutor::Global"),
            Pool::Owned(_) => formatter.write_str("PooledExecutor::Owned"),
        }
    }
}

// =============================================================================
// PoolBuilder
// =============================================================================

/// Configuration for a private [`PooledExecutor`].
///
/// Unset options fall back to the global runtime's settings: one worker per
/// CPU core and tokio's default blocking-thread limit.
#[derive(Debug, Clone, Default)]
pub struct PoolBuilder {
    worker_threads: Option<usize>,
    max_blocking_threads: Option<usize>,
    thread_name: Option<String>,
}

impl PoolBuilder {
    /// Sets the number of async worker threads.
    #[must_use]
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Caps the number of threads used for submitted work.
    #[must_use]
    pub fn max_blocking_threads(mut self, count: usize) -> Self {
        self.max_blocking_threads = Some(count);
        self
    }

    /// Names the pool's threads.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by tokio if the runtime's threads or
    /// drivers cannot be created.
    pub fn build(self) -> io::Result<PooledExecutor> {
        let mut builder = Builder::new_multi_thread();
        builder
            .worker_threads(self.worker_threads.unwrap_or_else(num_cpus::get))
            .thread_name(self.thread_name.unwrap_or_else(|| THREAD_NAME.to_string()))
            .enable_all();
        if let Some(count) = self.max_blocking_threads {
            builder.max_blocking_threads(count);
        }

        let runtime = builder.build()?;
        let handle = runtime.handle().clone();
        tracing::debug!(?handle, "built private futura pool");

        Ok(PooledExecutor {
            pool: Pool::Owned(Arc::new(OwnedRuntime {
                runtime: Some(runtime),
                handle,
            })),
        })
    }
}
