//! Calling conventions accepted by [`ErrorInterpreter::wrap`].
//!
//! The convention is picked once, when a callable is wrapped, from the marker
//! type its [`Wrappable`] impl is selected with:
//!
//! | callable                                   | marker              | `call`        |
//! |--------------------------------------------|---------------------|---------------|
//! | `Fn(A) -> Result<T, E>`                    | `(Blocking, A)`     | synchronous   |
//! | `Fn(A) -> Fut`, `Fut: Future<Output = ..>` | `(Suspending, A)`   | `async`       |
//! | any [`OrchestrationPrimitive`]             | `Orchestrated`      | rejected      |
//!
//! [`ErrorInterpreter::wrap`]: super::ErrorInterpreter::wrap

use std::future::Future;
use std::marker::PhantomData;

use super::ErrorInterpreter;
use super::error::{InterpretError, InterpretableError};

/// Marker for callables that return their result directly.
#[derive(Debug, Clone, Copy)]
pub struct Blocking;

/// Marker for callables that return a future.
#[derive(Debug, Clone, Copy)]
pub struct Suspending;

/// Marker for orchestration primitives.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrated;

/// Values owned by a workflow engine (tasks, flows).
///
/// They must not be wrapped by an interpreter; wrap the plain callable and hand
/// the wrapped value to the primitive instead.
pub trait OrchestrationPrimitive {
    fn primitive_name(&self) -> &str;
}

/// Something an [`ErrorInterpreter`] can wrap under the convention `Marker`.
pub trait Wrappable<Marker> {
    fn is_orchestration_primitive(&self) -> bool {
        false
    }

    /// Name reported when the value is rejected.
    fn describe(&self) -> Option<&str> {
        None
    }
}

impl<F, A, T, E> Wrappable<(Blocking, A)> for F where F: Fn(A) -> Result<T, E> {}

impl<F, A, Fut, T, E> Wrappable<(Suspending, A)> for F
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
}

impl<P: OrchestrationPrimitive> Wrappable<Orchestrated> for P {
    fn is_orchestration_primitive(&self) -> bool {
        true
    }

    fn describe(&self) -> Option<&str> {
        Some(self.primitive_name())
    }
}

/// A callable whose failures are reinterpreted.
///
/// Arguments go in as one value: a tuple for several, `()` for none.
pub struct Interpreted<F, M> {
    inner: F,
    interpreter: ErrorInterpreter,
    _convention: PhantomData<fn() -> M>,
}

impl<F, M> Interpreted<F, M> {
    pub(crate) fn new(inner: F, interpreter: ErrorInterpreter) -> Self {
        Self {
            inner,
            interpreter,
            _convention: PhantomData,
        }
    }

    pub fn interpreter(&self) -> &ErrorInterpreter {
        &self.interpreter
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Clone, M> Clone for Interpreted<F, M> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.interpreter.clone())
    }
}

impl<F, M> std::fmt::Debug for Interpreted<F, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreted")
            .field("block_name", &self.interpreter.block_name())
            .field("convention", &std::any::type_name::<M>())
            .finish()
    }
}

impl<F, A, T, E> Interpreted<F, (Blocking, A)>
where
    F: Fn(A) -> Result<T, E>,
    E: InterpretableError,
{
    /// Call the wrapped function; a failure is summarized before it returns.
    pub fn call(&self, args: A) -> Result<T, InterpretError<E>> {
        match (self.inner)(args) {
            Ok(value) => Ok(value),
            Err(error) => Err(self.interpreter.interpret_blocking(error)),
        }
    }
}

impl<F, A, Fut, T, E> Interpreted<F, (Suspending, A)>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: InterpretableError,
{
    /// Await the wrapped function; a failure is summarized before it returns.
    pub async fn call(&self, args: A) -> Result<T, InterpretError<E>> {
        match (self.inner)(args).await {
            Ok(value) => Ok(value),
            Err(error) => Err(self.interpreter.interpret(error).await),
        }
    }
}
