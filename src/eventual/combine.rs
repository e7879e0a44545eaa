//! Combining two independent eventuals.

use super::Eventual;
use crate::error::Failure;
use crate::executor::ExecutionPolicy;

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + 'static,
    E: Failure,
{
    /// Waits for both eventuals and combines their values with `function`.
    ///
    /// Completion is observed in order: first `self`, then `other`. A failure
    /// of `self` settles the result without waiting for `other`. Both sources
    /// keep running independently; only observation is sequenced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use futura::eventual::Eventual;
    /// use futura::executor::ExecutionPolicy;
    ///
    /// let greeting: Eventual<i32> = Eventual::succeeded(1);
    /// let name: Eventual<&str> = Eventual::succeeded("Hello");
    /// let combined = greeting.zip_with(&name, ExecutionPolicy::Pooled, |a, b| format!("{a}{b}"));
    /// assert_eq!(combined.get().unwrap(), "1Hello");
    /// ```
    pub fn zip_with<U, C, F>(
        &self,
        other: &Eventual<U, E>,
        executor: ExecutionPolicy,
        function: F,
    ) -> Eventual<C, E>
    where
        U: Clone + Send + 'static,
        C: Clone + Send + 'static,
        F: FnOnce(T, U) -> C + Send + 'static,
    {
        let other = other.clone();
        let inner_executor = executor.clone();
        self.flat_map(executor, move |first| {
            other.map(inner_executor, move |second| function(first, second))
        })
    }

    /// Pairs the values of both eventuals.
    pub fn zip<U>(&self, other: &Eventual<U, E>, executor: ExecutionPolicy) -> Eventual<(T, U), E>
    where
        U: Clone + Send + 'static,
    {
        self.zip_with(other, executor, |first, second| (first, second))
    }
}
