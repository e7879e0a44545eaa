//! The shared runtime behind [`ExecutionPolicy::Pooled`](super::ExecutionPolicy::Pooled).
//!
//! A multi-thread tokio runtime is built lazily on first access and lives for
//! the rest of the process. Pooled work runs on its blocking pool; async work
//! started with [`Eventual::spawn`](crate::eventual::Eventual::spawn) runs on
//! its workers.
//!
//! The global runtime is used even when the caller is already inside another
//! runtime. A current-thread test runtime that blocks on `Eventual::get`
//! would otherwise starve the very tasks it is waiting for.

use std::sync::LazyLock;

use tokio::runtime::{Builder, Runtime};

/// Name given to threads of the global runtime.
pub(crate) const THREAD_NAME: &str = "futura-pool";

/// Global tokio runtime initialized lazily on first access.
///
/// Worker threads equal the number of CPU cores. The runtime has static
/// lifetime and is never dropped.
static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name(THREAD_NAME)
        .enable_all()
        .build()
        .expect("Failed to create global futura runtime")
});

/// Returns a reference to the global runtime.
///
/// The same instance is returned from any thread.
#[inline]
#[must_use]
pub fn global() -> &'static Runtime {
    &GLOBAL_RUNTIME
}
