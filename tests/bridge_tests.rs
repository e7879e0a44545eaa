//! Integration tests for the bridge between `Eventual` and `Task`.

use std::time::Duration;

use futura::bridge::{self, Completer, Source, Target, Task};
use futura::error::{Error, FutureError};
use futura::eventual::{Eventual, future};
use futura::executor::ExecutionPolicy;
use rstest::rstest;

/// A minimal third participant: a blocking slot filled through a channel.
struct Slot<T> {
    receiver: std::sync::mpsc::Receiver<Result<T, FutureError>>,
}

struct SlotCompleter<T> {
    sender: std::sync::mpsc::Sender<Result<T, FutureError>>,
}

impl<T: Send + 'static> Completer<T, FutureError> for SlotCompleter<T> {
    fn complete(self, value: T) -> bool {
        self.sender.send(Ok(value)).is_ok()
    }

    fn fail(self, error: FutureError) -> bool {
        self.sender.send(Err(error)).is_ok()
    }
}

impl<T: Send + 'static> Target<T, FutureError> for Slot<T> {
    type Completer = SlotCompleter<T>;

    fn completable() -> (Self, Self::Completer) {
        let (sender, receiver) = std::sync::mpsc::channel();
        (Self { receiver }, SlotCompleter { sender })
    }
}

// =============================================================================
// Round trips
// =============================================================================

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn eventual_to_task_success() {
    let eventual: Eventual<i32> = future(ExecutionPolicy::Pooled, || Ok(21));
    let task: Task<i32> = bridge::adapt(&eventual, ExecutionPolicy::Inline);
    assert_eq!(task.await.unwrap(), 21);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn eventual_to_task_failure_is_unwrapped() {
    let eventual: Eventual<i32> = Eventual::failed(Error::wrap(Error::msg("upstream")));
    let task: Task<i32> = bridge::adapt(&eventual, ExecutionPolicy::Pooled);

    let error = task.await.unwrap_err();
    assert!(!error.is_wrapped());
    assert_eq!(error.to_string(), "upstream");
}

#[rstest]
fn task_to_eventual_success() {
    let task: Task<String> = Task::new(async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok("from async".to_string())
    });
    let eventual: Eventual<String> = bridge::adapt(&task, ExecutionPolicy::Pooled);
    assert_eq!(eventual.get().unwrap(), "from async");
}

#[rstest]
fn task_to_eventual_failure_is_unwrapped() {
    let task: Task<i32> = Task::ready(Err(Error::wrap(Error::new(FutureError::Cancelled))));
    let eventual: Eventual<i32> = bridge::adapt(&task, ExecutionPolicy::Inline);

    let error = eventual.get().unwrap_err();
    assert_eq!(error.downcast_ref::<FutureError>(), Some(&FutureError::Cancelled));
}

#[rstest]
fn round_trip_through_task_and_back() {
    let source: Eventual<i32> = future(ExecutionPolicy::Pooled, || Ok(3));
    let task: Task<i32> = bridge::adapt(&source, ExecutionPolicy::Inline);
    let back: Eventual<i32> = bridge::adapt(&task, ExecutionPolicy::Inline);

    assert_eq!(back.map(ExecutionPolicy::Inline, |value| value * 2).get().unwrap(), 6);
}

#[rstest]
fn adapt_into_custom_target() {
    let source: Eventual<&str, FutureError> = Eventual::pending();
    let slot: Slot<&str> = bridge::adapt(&source, ExecutionPolicy::Pooled);

    source.complete("filled");
    assert_eq!(
        slot.receiver.recv_timeout(Duration::from_secs(5)),
        Ok(Ok("filled"))
    );
}

#[rstest]
fn task_source_reports_to_any_callback() {
    let task: Task<i32, FutureError> = Task::ready(Ok(8));
    let (sender, receiver) = std::sync::mpsc::channel();

    task.subscribe(ExecutionPolicy::Pooled, move |outcome| {
        sender.send(outcome).unwrap();
    });

    assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(Ok(8)));
}

#[rstest]
#[tokio::test]
async fn abandoned_task_target_fails() {
    let (task, completer) = <Task<i32> as Target<_, _>>::completable();
    drop(completer);

    let error = task.await.unwrap_err();
    assert_eq!(error.downcast_ref::<FutureError>(), Some(&FutureError::Abandoned));
}
