//! Error reinterpretation.
//!
//! An [`ErrorInterpreter`] wraps a fallible callable. When the callable fails,
//! the error message is sent to a stored [`CompletionModel`] block for a short
//! summary, and a new error of the same type is returned with the summary
//! appended:
//!
//! ```text
//! division by zero
//! OpenAI: division has no solution here
//! ```
//!
//! ```rust,ignore
//! let interpreter = ErrorInterpreter::new(store, "curie");
//! let checked = interpreter.wrap(|(a, b): (i64, i64)| divide(a, b))?;
//! match checked.call((6, 0)) {
//!     Err(InterpretError::Reinterpreted(e)) => eprintln!("{e}"),
//!     _ => {}
//! }
//! ```
//!
//! Successful calls go through untouched and never reach the API.

mod convention;
mod error;

pub use convention::{
    Blocking, Interpreted, Orchestrated, OrchestrationPrimitive, Suspending, Wrappable,
};
pub use error::{CapturedFailure, ForeignError, InterpretError, InterpretableError};

use std::future::Future;
use std::sync::Arc;

use crate::blocks::{BlockStore, BlockStoreExt};
use crate::completion::CompletionModel;
use crate::error::BlockError;
use crate::runtime;

/// Reinterprets failures through a named [`CompletionModel`] block.
#[derive(Clone)]
pub struct ErrorInterpreter {
    store: Arc<dyn BlockStore>,
    block_name: String,
}

impl std::fmt::Debug for ErrorInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorInterpreter")
            .field("block_name", &self.block_name)
            .finish_non_exhaustive()
    }
}

impl ErrorInterpreter {
    /// The block is looked up by name on every failure, not here.
    pub fn new(store: Arc<dyn BlockStore>, block_name: impl Into<String>) -> Self {
        Self {
            store,
            block_name: block_name.into(),
        }
    }

    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    /// Wrap `f`, choosing its calling convention from its signature.
    ///
    /// Orchestration primitives are rejected with [`BlockError::UsageError`];
    /// nothing is executed.
    pub fn wrap<F, M>(&self, f: F) -> Result<Interpreted<F, M>, BlockError>
    where
        F: Wrappable<M>,
    {
        if f.is_orchestration_primitive() {
            let name = f.describe().unwrap_or("<unnamed>");
            return Err(BlockError::UsageError(format!(
                "cannot interpret errors of orchestration primitive {name:?}; \
                 wrap the function it runs instead, then build the primitive from the wrapped function"
            )));
        }
        Ok(Interpreted::new(f, self.clone()))
    }

    /// Run `f` once, reinterpreting its failure.
    pub async fn run<F, Fut, T, E>(&self, f: F) -> Result<T, InterpretError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: InterpretableError,
    {
        match f().await {
            Ok(value) => Ok(value),
            Err(error) => Err(self.interpret(error).await),
        }
    }

    /// Blocking counterpart of [`run`](Self::run).
    pub fn run_blocking<F, T, E>(&self, f: F) -> Result<T, InterpretError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        E: InterpretableError,
    {
        f().map_err(|error| self.interpret_blocking(error))
    }

    /// Reinterpret an error that has already happened.
    pub async fn interpret<E: InterpretableError>(&self, error: E) -> InterpretError<E> {
        let failure = CapturedFailure::capture(error);
        let original = failure.error.to_string();
        let summary = self.summarize(&original).await;
        self.finish(failure, original, summary)
    }

    /// Blocking counterpart of [`interpret`](Self::interpret).
    pub fn interpret_blocking<E: InterpretableError>(&self, error: E) -> InterpretError<E> {
        let failure = CapturedFailure::capture(error);
        let original = failure.error.to_string();
        let summary = runtime::block_on(self.summarize(&original));
        self.finish(failure, original, summary)
    }

    fn finish<E: InterpretableError>(
        &self,
        failure: CapturedFailure<E>,
        original: String,
        summary: Result<String, BlockError>,
    ) -> InterpretError<E> {
        match summary {
            Ok(summary) => {
                let message = format!("{original}\nOpenAI: {summary}");
                InterpretError::Reinterpreted(E::reinterpret(failure, message))
            }
            Err(error) => {
                tracing::warn!(
                    block_name = %self.block_name,
                    error = %error,
                    "could not interpret error"
                );
                InterpretError::Interpretation {
                    error,
                    original: failure.into_error(),
                }
            }
        }
    }

    async fn summarize(&self, message: &str) -> Result<String, BlockError> {
        let model: CompletionModel = self.store.load_block(&self.block_name).await?;
        let prompt = format!("Summarize: ```{message}```.");
        let completion = model.submit_prompt(&prompt).await?;
        completion
            .text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                BlockError::ParseError("completion response contained no choices".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::MemoryBlockStore;
    use crate::credentials::OpenAiCredentials;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn interpreter_for(server: &MockServer) -> ErrorInterpreter {
        let store = Arc::new(MemoryBlockStore::new());
        let model = CompletionModel::new(OpenAiCredentials::new("sk").with_base_url(server.uri()));
        store.save_block("curie", &model, false).await.unwrap();
        ErrorInterpreter::new(store, "curie")
    }

    #[tokio::test]
    async fn prompt_quotes_the_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(body_partial_json(json!({
                "prompt": "Summarize: ```disk full```."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"text": "\n\nno space left\n"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let interpreter = interpreter_for(&server).await;
        let err = interpreter.interpret(ForeignError::msg("disk full")).await;
        assert!(err.is_reinterpreted());
        assert_eq!(err.to_string(), "disk full\nOpenAI: no space left");
    }

    #[tokio::test]
    async fn empty_choices_are_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let interpreter = interpreter_for(&server).await;
        let err = interpreter.interpret(ForeignError::msg("boom")).await;
        assert!(matches!(
            err.interpretation_error(),
            Some(BlockError::ParseError(_))
        ));
        assert_eq!(err.into_inner().message(), "boom");
    }

    #[tokio::test]
    async fn success_never_calls_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let interpreter = interpreter_for(&server).await;
        let value = interpreter
            .run(|| async { Ok::<_, ForeignError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
