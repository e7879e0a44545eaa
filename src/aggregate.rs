//! Aggregate operations over ordered collections of eventuals.
//!
//! Results, and the failure that short-circuits an aggregate, follow the
//! iteration order of the input, whatever order the inputs actually settle
//! in. The exception is [`first_completed_of`], which is decided by
//! wall-clock completion.
//!
//! # Examples
//!
//! ```rust
//! use futura::aggregate;
//! use futura::eventual::{Eventual, future};
//! use futura::executor::ExecutionPolicy;
//!
//! let inputs: Vec<Eventual<i32>> = (1..=3)
//!     .map(|value| future(ExecutionPolicy::Pooled, move || Ok(value)))
//!     .collect();
//! let sum = aggregate::fold(inputs, 0, ExecutionPolicy::Pooled, |total, value| total + value);
//! assert_eq!(sum.get().unwrap(), 6);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::error::{Failure, FutureError};
use crate::eventual::{Eventual, guarded};
use crate::executor::ExecutionPolicy;

// =============================================================================
// fold / reduce
// =============================================================================

/// Drives a fold one input at a time, in iteration order.
struct Fold<A, R, E, F> {
    remaining: std::vec::IntoIter<Eventual<A, E>>,
    accumulator: R,
    operation: F,
    executor: ExecutionPolicy,
    target: Eventual<R, E>,
}

/// Ownership of a suspended fold while its next input is being observed.
enum Handoff<S, T> {
    /// `observe` has not returned yet on the registering thread.
    Registering(S, ThreadId),
    /// The observer fired on the registering thread before `observe`
    /// returned; the registering loop picks the outcome up.
    Fired(S, T),
    /// `observe` returned first; the observer drives the fold.
    Waiting(S),
    /// The fold has been handed to whoever drives it next.
    Taken,
}

impl<A, R, E, F> Fold<A, R, E, F>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    E: Failure,
    F: FnMut(R, A) -> R + Send + 'static,
{
    /// Moves to the next unsettled input.
    ///
    /// Inputs whose observer runs before `observe` returns, on this thread,
    /// are consumed by the loop rather than by recursion, whatever the
    /// executor.
    fn advance(mut self) {
        loop {
            let Some(next) = self.remaining.next() else {
                self.target.complete(self.accumulator);
                return;
            };

            if self.executor.is_inline()
                && let Some(outcome) = next.peek()
            {
                match self.apply(outcome) {
                    Some(fold) => {
                        self = fold;
                        continue;
                    }
                    None => return,
                }
            }

            let executor = self.executor.clone();
            let registrar = thread::current().id();
            let handoff = Arc::new(Mutex::new(Handoff::Registering(self, registrar)));
            let observed = Arc::clone(&handoff);
            next.observe(executor, move |outcome| {
                let mut state = observed.lock();
                let fold = match std::mem::replace(&mut *state, Handoff::Taken) {
                    Handoff::Registering(fold, id) if id == thread::current().id() => {
                        *state = Handoff::Fired(fold, outcome);
                        return;
                    }
                    Handoff::Registering(fold, _) | Handoff::Waiting(fold) => fold,
                    other => {
                        *state = other;
                        return;
                    }
                };
                drop(state);
                if let Some(fold) = fold.apply(outcome) {
                    fold.advance();
                }
            });

            let mut state = handoff.lock();
            match std::mem::replace(&mut *state, Handoff::Taken) {
                Handoff::Fired(fold, outcome) => {
                    drop(state);
                    match fold.apply(outcome) {
                        Some(fold) => self = fold,
                        None => return,
                    }
                }
                Handoff::Registering(fold, _) => {
                    *state = Handoff::Waiting(fold);
                    return;
                }
                other => {
                    *state = other;
                    return;
                }
            }
        }
    }

    /// Folds one outcome in; `None` means the target has been settled.
    fn apply(mut self, outcome: Result<A, E>) -> Option<Self> {
        match outcome {
            Ok(value) => {
                let accumulator = self.accumulator;
                let operation = &mut self.operation;
                match guarded(move || operation(accumulator, value)) {
                    Ok(accumulator) => {
                        self.accumulator = accumulator;
                        Some(self)
                    }
                    Err(panic) => {
                        self.target.fail(E::from(panic));
                        None
                    }
                }
            }
            Err(error) => {
                self.target.fail(error);
                None
            }
        }
    }
}

/// Combines the inputs' values into `initial` with `operation`, strictly in
/// iteration order.
///
/// The first failure in iteration order fails the result, even if a later
/// input settled (or failed) earlier in time. An empty input succeeds with
/// `initial`.
pub fn fold<A, R, E, I, F>(
    futures: I,
    initial: R,
    executor: ExecutionPolicy,
    operation: F,
) -> Eventual<R, E>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    E: Failure,
    F: FnMut(R, A) -> R + Send + 'static,
{
    let target = Eventual::pending();
    Fold {
        remaining: futures.into_iter().collect::<Vec<_>>().into_iter(),
        accumulator: initial,
        operation,
        executor,
        target: target.clone(),
    }
    .advance();
    target
}

/// Like [`fold`], seeded with the first input's value.
///
/// # Errors
///
/// Returns [`FutureError::EmptyCollection`] right away when `futures` is
/// empty; no eventual is created.
///
/// # Examples
///
/// ```rust
/// use futura::aggregate;
/// use futura::error::FutureError;
/// use futura::eventual::Eventual;
/// use futura::executor::ExecutionPolicy;
///
/// let empty: Vec<Eventual<i32>> = Vec::new();
/// assert_eq!(
///     aggregate::reduce(empty, ExecutionPolicy::Inline, |a, b| a + b).unwrap_err(),
///     FutureError::EmptyCollection
/// );
/// ```
pub fn reduce<A, E, I, F>(
    futures: I,
    executor: ExecutionPolicy,
    operation: F,
) -> Result<Eventual<A, E>, FutureError>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    E: Failure,
    F: FnMut(A, A) -> A + Send + 'static,
{
    let mut futures = futures.into_iter().collect::<Vec<_>>().into_iter();
    let first = futures.next().ok_or(FutureError::EmptyCollection)?;
    let inner_executor = executor.clone();
    Ok(first.flat_map(executor, move |seed| {
        fold(futures, seed, inner_executor, operation)
    }))
}

// =============================================================================
// Collecting
// =============================================================================

/// Maps every input value with `function`, collecting the results in input
/// order. Fails with the first failure in iteration order.
pub fn transform<A, B, E, I, F>(
    futures: I,
    executor: ExecutionPolicy,
    mut function: F,
) -> Eventual<Vec<B>, E>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Failure,
    F: FnMut(A) -> B + Send + 'static,
{
    let futures: Vec<_> = futures.into_iter().collect();
    let results = Vec::with_capacity(futures.len());
    fold(futures, results, executor, move |mut results, value| {
        results.push(function(value));
        results
    })
}

/// Collects every input value in order; all or nothing.
///
/// # Examples
///
/// ```rust
/// use futura::aggregate;
/// use futura::eventual::Eventual;
/// use futura::executor::ExecutionPolicy;
///
/// let inputs: Vec<Eventual<i32>> = vec![Eventual::succeeded(1), Eventual::succeeded(2)];
/// let all = aggregate::all_as_list(inputs, ExecutionPolicy::Inline);
/// assert_eq!(all.get().unwrap(), vec![1, 2]);
/// ```
pub fn all_as_list<A, E, I>(futures: I, executor: ExecutionPolicy) -> Eventual<Vec<A>, E>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    E: Failure,
{
    transform(futures, executor, |value| value)
}

/// Collects the values of the inputs that succeed, in input order.
///
/// Failed inputs are skipped. The result never fails; it settles once every
/// input has settled.
pub fn successful_list<A, E, I>(futures: I, executor: ExecutionPolicy) -> Eventual<Vec<A>, E>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    E: Failure,
{
    let futures: Vec<_> = futures.into_iter().collect();
    if futures.is_empty() {
        return Eventual::succeeded(Vec::new());
    }

    let target = Eventual::pending();
    let slots = Arc::new(Mutex::new(vec![None; futures.len()]));
    let remaining = Arc::new(AtomicUsize::new(futures.len()));

    for (index, future) in futures.into_iter().enumerate() {
        let slots = Arc::clone(&slots);
        let remaining = Arc::clone(&remaining);
        let target = target.clone();
        future.observe(executor.clone(), move |outcome| {
            if let Ok(value) = outcome {
                slots.lock()[index] = Some(value);
            }
            if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                let values = std::mem::take(&mut *slots.lock());
                target.complete(values.into_iter().flatten().collect());
            }
        });
    }

    target
}

/// Settles with the outcome of whichever input settles first.
///
/// The other inputs are left running. An empty input yields an eventual that
/// never settles.
pub fn first_completed_of<A, E, I>(futures: I, executor: ExecutionPolicy) -> Eventual<A, E>
where
    I: IntoIterator<Item = Eventual<A, E>>,
    A: Clone + Send + 'static,
    E: Failure,
{
    let target = Eventual::pending();
    for future in futures {
        let target = target.clone();
        future.observe(executor.clone(), move |outcome| {
            target.settle(outcome);
        });
    }
    target
}
