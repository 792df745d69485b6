//! Named units of work.

use std::future::Future;

use tracing::Instrument;

use crate::interpret::OrchestrationPrimitive;

/// A named callable run inside a `task` span.
///
/// Tasks are orchestration primitives and cannot be passed to
/// [`ErrorInterpreter::wrap`](crate::interpret::ErrorInterpreter::wrap).
/// Wrap the function first and build the task around the wrapped value:
///
/// ```rust,ignore
/// let checked = interpreter.wrap(|(a, b): (i64, i64)| divide(a, b))?;
/// let task = Task::new("divide", move |args| checked.call(args));
/// task.call((6, 0))?;
/// ```
#[derive(Debug, Clone)]
pub struct Task<F> {
    name: String,
    func: F,
}

impl<F> Task<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: std::fmt::Display,
    {
        let span = tracing::info_span!("task", name = %self.name);
        let _entered = span.enter();
        let result = (self.func)(args);
        log_final_state(&self.name, &result);
        result
    }

    pub async fn call_async<A, Fut, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let span = tracing::info_span!("task", name = %self.name);
        let result = (self.func)(args).instrument(span.clone()).await;
        span.in_scope(|| log_final_state(&self.name, &result));
        result
    }
}

impl<F> OrchestrationPrimitive for Task<F> {
    fn primitive_name(&self) -> &str {
        &self.name
    }
}

fn log_final_state<T, E: std::fmt::Display>(name: &str, result: &Result<T, E>) {
    match result {
        Ok(_) => tracing::info!(task = name, "Finished in state Completed()"),
        Err(e) => tracing::error!(task = name, error = %e, "Finished in state Failed"),
    }
}
