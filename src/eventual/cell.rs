//! Single-assignment completion cell.
//!
//! # Invariants
//!
//! - `state` moves `PENDING -> SETTLING -> SETTLED` and never back. Only the
//!   thread that wins the `PENDING -> SETTLING` exchange writes the outcome.
//! - `slot.outcome` is `Some` exactly when `state` is `SETTLED`; both are
//!   updated under the `slot` lock.
//! - An observer is either queued in `slot.observers` (while pending) or
//!   dispatched by the registering thread (once settled), never both.
//! - Observers run through their executor after the lock is released.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;

use crate::executor::{ExecutionPolicy, Executor};

/// State: no outcome yet
const PENDING: u8 = 0;
/// State: an outcome is being written
const SETTLING: u8 = 1;
/// State: outcome written, observers released
const SETTLED: u8 = 2;

/// A continuation waiting for the outcome of a cell.
pub(crate) type Callback<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

struct Observer<T, E> {
    executor: ExecutionPolicy,
    callback: Callback<T, E>,
}

impl<T, E> Observer<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn dispatch(self, outcome: Result<T, E>) {
        let Self { executor, callback } = self;
        executor.submit(Box::new(move || callback(outcome)));
    }
}

struct Slot<T, E> {
    outcome: Option<Result<T, E>>,
    observers: SmallVec<[Observer<T, E>; 2]>,
}

pub(crate) struct Cell<T, E> {
    state: AtomicU8,
    slot: Mutex<Slot<T, E>>,
    settled: Condvar,
}

impl<T, E> Cell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            slot: Mutex::new(Slot {
                outcome: None,
                observers: SmallVec::new(),
            }),
            settled: Condvar::new(),
        }
    }

    pub(crate) fn with_outcome(outcome: Result<T, E>) -> Self {
        Self {
            state: AtomicU8::new(SETTLED),
            slot: Mutex::new(Slot {
                outcome: Some(outcome),
                observers: SmallVec::new(),
            }),
            settled: Condvar::new(),
        }
    }

    /// Writes the outcome if the cell is still pending.
    ///
    /// Returns `false`, leaving the cell untouched, if another writer got
    /// there first.
    pub(crate) fn settle(&self, outcome: Result<T, E>) -> bool {
        if self
            .state
            .compare_exchange(PENDING, SETTLING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("ignored completion of an already settled eventual");
            return false;
        }

        let observers = {
            let mut slot = self.slot.lock();
            slot.outcome = Some(outcome.clone());
            self.state.store(SETTLED, Ordering::Release);
            self.settled.notify_all();
            std::mem::take(&mut slot.observers)
        };

        tracing::trace!(
            succeeded = outcome.is_ok(),
            observers = observers.len(),
            "eventual settled"
        );
        fan_out(observers, outcome);
        true
    }

    /// Queues `callback`, or dispatches it right away if already settled.
    pub(crate) fn register(&self, executor: ExecutionPolicy, callback: Callback<T, E>) {
        let observer = Observer { executor, callback };
        let mut slot = self.slot.lock();
        if let Some(outcome) = slot.outcome.clone() {
            drop(slot);
            observer.dispatch(outcome);
        } else {
            slot.observers.push(observer);
        }
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.state.load(Ordering::Acquire) == SETTLED
    }

    pub(crate) fn peek(&self) -> Option<Result<T, E>> {
        if !self.is_settled() {
            return None;
        }
        self.slot.lock().outcome.clone()
    }

    /// Blocks until the cell settles.
    pub(crate) fn wait(&self) -> Result<T, E> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(outcome) = &slot.outcome {
                return outcome.clone();
            }
            self.settled.wait(&mut slot);
        }
    }

    /// Blocks until the cell settles or `deadline` passes.
    pub(crate) fn wait_until(&self, deadline: Instant) -> Option<Result<T, E>> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(outcome) = &slot.outcome {
                return Some(outcome.clone());
            }
            if self.settled.wait_until(&mut slot, deadline).timed_out() {
                return slot.outcome.clone();
            }
        }
    }
}

fn fan_out<T, E>(observers: SmallVec<[Observer<T, E>; 2]>, outcome: Result<T, E>)
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let mut observers = observers.into_iter();
    let Some(last) = observers.next_back() else {
        return;
    };
    for observer in observers {
        observer.dispatch(outcome.clone());
    }
    last.dispatch(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    type TestCell = Cell<i32, String>;

    fn counting_callback(counter: &Arc<AtomicUsize>) -> Callback<i32, String> {
        let counter = Arc::clone(counter);
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[rstest]
    fn new_cell_is_pending() {
        let cell = TestCell::new();
        assert!(!cell.is_settled());
        assert_eq!(cell.peek(), None);
    }

    #[rstest]
    fn first_settle_wins() {
        let cell = TestCell::new();
        assert!(cell.settle(Ok(1)));
        assert!(!cell.settle(Ok(2)));
        assert!(!cell.settle(Err("late".to_string())));
        assert_eq!(cell.peek(), Some(Ok(1)));
    }

    #[rstest]
    fn observers_fire_once_on_settle() {
        let cell = TestCell::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            cell.register(ExecutionPolicy::Inline, counting_callback(&counter));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        cell.settle(Ok(1));
        cell.settle(Ok(2));

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[rstest]
    fn late_observer_fires_immediately() {
        let cell = TestCell::with_outcome(Err("failed".to_string()));
        let counter = Arc::new(AtomicUsize::new(0));

        cell.register(ExecutionPolicy::Inline, counting_callback(&counter));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn concurrent_settle_has_exactly_one_winner() {
        let cell = Arc::new(TestCell::new());
        let counter = Arc::new(AtomicUsize::new(0));
        cell.register(ExecutionPolicy::Inline, counting_callback(&counter));

        let winners: usize = (0..8)
            .map(|index| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || usize::from(cell.settle(Ok(index))))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .sum();

        assert_eq!(winners, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn concurrent_register_and_settle_loses_no_observer() {
        for _ in 0..50 {
            let cell = Arc::new(TestCell::new());
            let counter = Arc::new(AtomicUsize::new(0));

            let registrars: Vec<_> = (0..4)
                .map(|_| {
                    let cell = Arc::clone(&cell);
                    let counter = Arc::clone(&counter);
                    thread::spawn(move || {
                        for _ in 0..10 {
                            cell.register(ExecutionPolicy::Inline, counting_callback(&counter));
                        }
                    })
                })
                .collect();
            cell.settle(Ok(1));
            for registrar in registrars {
                registrar.join().unwrap();
            }

            assert_eq!(counter.load(Ordering::SeqCst), 40);
        }
    }

    #[rstest]
    fn wait_blocks_until_settled() {
        let cell = Arc::new(TestCell::new());
        let writer = Arc::clone(&cell);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.settle(Ok(42));
        });

        assert_eq!(cell.wait(), Ok(42));
        handle.join().unwrap();
    }

    #[rstest]
    fn wait_until_times_out_on_pending_cell() {
        let cell = TestCell::new();
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(cell.wait_until(deadline), None);
    }

    #[rstest]
    fn wait_until_returns_settled_outcome() {
        let cell = TestCell::with_outcome(Ok(3));
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(cell.wait_until(deadline), Some(Ok(3)));
    }
}
