//! # futura
//!
//! A combinator algebra for eventually-resolved values.
//!
//! ## Overview
//!
//! An [`Eventual<T, E>`](eventual::Eventual) is a single-assignment container
//! that settles, exactly once, as a success or a failure. Combinators derive
//! new eventuals from existing ones without blocking the caller; each takes an
//! [`ExecutionPolicy`](executor::ExecutionPolicy) naming where its
//! continuation runs.
//!
//! - **Executors**: inline, a shared pooled runtime, or any custom `Executor`
//! - **Eventual**: construction, blocking and async reads, sequential,
//!   combination, recovery and observation combinators
//! - **Aggregates**: `fold`, `reduce`, `transform`, `all_as_list`,
//!   `successful_list`, `first_completed_of`
//! - **Bridge**: one-way forwarding between future implementations, with
//!   [`Task`](bridge::Task) as the async/await-side participant
//!
//! ## Example
//!
//! ```rust
//! use futura::prelude::*;
//!
//! let prices: Vec<Eventual<u32>> = vec![
//!     future(Pooled, || Ok(120)),
//!     future(Pooled, || Ok(80)),
//! ];
//! let total = aggregate::fold(prices, 0, Pooled, |sum, price| sum + price)
//!     .map(Inline, |sum| sum * 2)
//!     .recover(|_| Ok(0));
//!
//! assert_eq!(total.get().unwrap(), 400);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use futura::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate;
    pub use crate::bridge::{Completer, Source, Target, Task, adapt};
    pub use crate::error::{Error, Failure, FutureError};
    pub use crate::eventual::{Eventual, IntoEventual, IntoFailed, future, immediate};
    pub use crate::executor::ExecutionPolicy::{self, Inline, Pooled};
    pub use crate::executor::{Executor, InlineExecutor, PooledExecutor};
}

pub mod aggregate;
pub mod bridge;
pub mod error;
pub mod eventual;
pub mod executor;
