//! Errors produced by interpreted callables and the rebuild contract.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::error::BlockError;

/// The failure of an interpreted callable.
///
/// Rust errors carry no trace of their own, so the backtrace is captured at
/// the moment the interpreter receives the error.
pub struct CapturedFailure<E> {
    pub error: E,
    pub backtrace: Backtrace,
}

impl<E> CapturedFailure<E> {
    pub fn capture(error: E) -> Self {
        Self {
            error,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn into_error(self) -> E {
        self.error
    }

    pub fn into_parts(self) -> (E, Backtrace) {
        (self.error, self.backtrace)
    }
}

impl<E: fmt::Debug> fmt::Debug for CapturedFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedFailure")
            .field("error", &self.error)
            .field("backtrace", &self.backtrace.status())
            .finish()
    }
}

/// An error type that can be rebuilt around a new message.
///
/// `reinterpret` must return a value of the same type that keeps every piece
/// of state other than the message, and should report the captured error as
/// its `source()`.
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct LedgerError {
///     account: u32,
///     message: String,
///     cause: Option<Box<LedgerError>>,
/// }
///
/// impl std::fmt::Display for LedgerError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str(&self.message)
///     }
/// }
///
/// // `source()` must hand out the inner error, not the `Box`, so callers can
/// // `downcast_ref::<LedgerError>()` it.
/// impl std::error::Error for LedgerError {
///     fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
///         self.cause.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
///     }
/// }
///
/// impl InterpretableError for LedgerError {
///     fn reinterpret(failure: CapturedFailure<Self>, message: String) -> Self {
///         let original = failure.into_error();
///         Self { account: original.account, message, cause: Some(Box::new(original)) }
///     }
/// }
/// ```
pub trait InterpretableError: StdError + Send + Sync + Sized + 'static {
    fn reinterpret(failure: CapturedFailure<Self>, message: String) -> Self;
}

/// `std::io::Error` keeps its `ErrorKind`; the payload becomes a
/// [`ForeignError`] whose source is the original error.
impl InterpretableError for std::io::Error {
    fn reinterpret(failure: CapturedFailure<Self>, message: String) -> Self {
        let kind = failure.error.kind();
        std::io::Error::new(kind, ForeignError::from_failure(failure, message))
    }
}

/// Best-effort carrier for errors whose type cannot be rebuilt.
///
/// Keeps the message, the original error as `source()` and a backtrace, but
/// not the original type.
pub struct ForeignError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Option<Backtrace>,
}

impl ForeignError {
    /// Wrap an arbitrary error so it can go through an interpreter.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
            backtrace: None,
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            backtrace: None,
        }
    }

    pub fn from_failure<E>(failure: CapturedFailure<E>, message: String) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let (error, backtrace) = failure.into_parts();
        Self {
            message,
            source: Some(Box::new(error)),
            backtrace: Some(backtrace),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }
}

impl fmt::Display for ForeignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for ForeignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignError")
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl StdError for ForeignError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl InterpretableError for ForeignError {
    fn reinterpret(failure: CapturedFailure<Self>, message: String) -> Self {
        Self::from_failure(failure, message)
    }
}

/// Outcome of a failed interpreted call.
#[derive(Debug, Error)]
pub enum InterpretError<E>
where
    E: StdError + 'static,
{
    /// The callable's error, rebuilt with an explanation appended.
    #[error(transparent)]
    Reinterpreted(E),

    /// Obtaining the explanation failed. Displays as the interpretation
    /// failure; the callable's error is its source.
    #[error("{error}")]
    Interpretation {
        error: BlockError,
        #[source]
        original: E,
    },
}

impl<E> InterpretError<E>
where
    E: StdError + 'static,
{
    pub fn is_reinterpreted(&self) -> bool {
        matches!(self, Self::Reinterpreted(_))
    }

    /// The reinterpreted error, or the untouched original when
    /// interpretation failed.
    pub fn into_inner(self) -> E {
        match self {
            Self::Reinterpreted(e) | Self::Interpretation { original: e, .. } => e,
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            Self::Reinterpreted(e) | Self::Interpretation { original: e, .. } => e,
        }
    }

    pub fn interpretation_error(&self) -> Option<&BlockError> {
        match self {
            Self::Reinterpreted(_) => None,
            Self::Interpretation { error, .. } => Some(error),
        }
    }
}
