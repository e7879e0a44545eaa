//! Error types for eventual values.
//!
//! Failures are carried as data on a settled [`Eventual`](crate::eventual::Eventual)
//! and are never logged or reported on their own. This module provides:
//!
//! - [`FutureError`]: failures synthesized by the combinator machinery itself
//!   (an unsatisfied `filter`, an empty `reduce`, a panicking callback, ...).
//! - [`Error`]: the default, dynamically typed failure. It can hold any
//!   `std::error::Error` and supports matching by concrete kind, which is what
//!   [`Eventual::map_error`](crate::eventual::Eventual::map_error) relies on.
//! - [`Failure`]: the bound every failure type of an `Eventual` satisfies.
//!
//! # Wrapped causes
//!
//! A completion primitive may wrap a user-raised error in one extra layer
//! (see [`Error::wrap`]). Recovery and observation combinators strip exactly
//! one such layer via [`Failure::into_cause`] before handing the error to user
//! code.
//!
//! # Examples
//!
//! ```rust
//! use futura::error::{Error, Failure, FutureError};
//!
//! let error = Error::wrap(Error::new(FutureError::PredicateNotSatisfied));
//! assert!(error.downcast_ref::<FutureError>().is_none());
//!
//! let cause = error.into_cause();
//! assert_eq!(
//!     cause.downcast_ref::<FutureError>(),
//!     Some(&FutureError::PredicateNotSatisfied)
//! );
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// FutureError
// =============================================================================

/// Failures produced by the library rather than by user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureError {
    /// The predicate given to `filter` returned `false`.
    PredicateNotSatisfied,

    /// `reduce` was given an empty collection.
    EmptyCollection,

    /// A supplied function panicked. Holds the panic message when one was
    /// available.
    Panicked(String),

    /// The eventual was cancelled before it settled.
    Cancelled,

    /// The completing side went away without ever settling the value.
    Abandoned,
}

impl FutureError {
    /// Builds a `Panicked` error from a payload caught by `catch_unwind`.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}

impl fmt::Display for FutureError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PredicateNotSatisfied => {
                write!(formatter, "Eventual::filter predicate is not satisfied")
            }
            Self::EmptyCollection => {
                write!(formatter, "empty collection can't be reduced")
            }
            Self::Panicked(message) => {
                write!(formatter, "supplied function panicked: {message}")
            }
            Self::Cancelled => write!(formatter, "eventual was cancelled"),
            Self::Abandoned => {
                write!(formatter, "completer dropped without settling the value")
            }
        }
    }
}

impl StdError for FutureError {}

// =============================================================================
// Failure
// =============================================================================

/// Bound satisfied by every failure type an [`Eventual`](crate::eventual::Eventual)
/// can carry.
///
/// `From<FutureError>` lets the library report its own failures (filter
/// mismatches, caught panics, cancellation) in the caller's error type.
///
/// # Examples
///
/// ```rust
/// use futura::error::{Failure, FutureError};
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum FetchError {
///     NotFound,
///     Internal(FutureError),
/// }
///
/// impl From<FutureError> for FetchError {
///     fn from(error: FutureError) -> Self {
///         Self::Internal(error)
///     }
/// }
///
/// impl Failure for FetchError {}
///
/// assert_eq!(FetchError::NotFound.into_cause(), FetchError::NotFound);
/// ```
pub trait Failure: Clone + Send + 'static + From<FutureError> {
    /// Strips one layer of wrapping added by a completion primitive.
    ///
    /// The default implementation returns the error unchanged.
    #[must_use]
    fn into_cause(self) -> Self {
        self
    }
}

impl Failure for FutureError {}

// =============================================================================
// Error
// =============================================================================

type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// The default failure type: any `std::error::Error`, shared behind an `Arc`.
///
/// Cloning an `Error` is cheap and every clone refers to the same underlying
/// error value.
#[derive(Clone)]
pub struct Error {
    inner: Repr,
}

#[derive(Clone)]
enum Repr {
    Raised(SharedError),
    Wrapped(Box<Error>),
}

/// Error payload for [`Error::msg`].
#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl StdError for Message {}

impl Error {
    /// Wraps a concrete error.
    pub fn new<K>(error: K) -> Self
    where
        K: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Repr::Raised(Arc::new(error)),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Adds one wrapper layer around `cause`, the way a completion primitive
    /// reports an error raised by user code.
    #[must_use]
    pub fn wrap(cause: Self) -> Self {
        Self {
            inner: Repr::Wrapped(Box::new(cause)),
        }
    }

    /// Returns `true` if this error is a wrapper around another error.
    pub const fn is_wrapped(&self) -> bool {
        matches!(self.inner, Repr::Wrapped(_))
    }

    /// Returns the wrapped cause, or `self` if there is no wrapper.
    pub fn cause(&self) -> &Self {
        match &self.inner {
            Repr::Wrapped(cause) => cause,
            Repr::Raised(_) => self,
        }
    }

    /// Returns `true` if the error (without unwrapping) is of kind `K`.
    pub fn is<K>(&self) -> bool
    where
        K: StdError + 'static,
    {
        self.downcast_ref::<K>().is_some()
    }

    /// Attempts to view the error (without unwrapping) as kind `K`.
    pub fn downcast_ref<K>(&self) -> Option<&K>
    where
        K: StdError + 'static,
    {
        match &self.inner {
            Repr::Raised(error) => error.downcast_ref::<K>(),
            Repr::Wrapped(_) => None,
        }
    }
}

impl Failure for Error {
    fn into_cause(self) -> Self {
        match self.inner {
            Repr::Wrapped(cause) => *cause,
            Repr::Raised(_) => self,
        }
    }
}

impl From<FutureError> for Error {
    fn from(error: FutureError) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Repr::Raised(error) => fmt::Debug::fmt(error, formatter),
            Repr::Wrapped(cause) => formatter.debug_tuple("Wrapped").field(cause).finish(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Repr::Raised(error) => fmt::Display::fmt(error, formatter),
            Repr::Wrapped(cause) => write!(formatter, "execution failed: {cause}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.inner {
            Repr::Raised(error) => error.source(),
            Repr::Wrapped(cause) => Some(&**cause),
        }
    }
}
