//! # openai-blocks
//!
//! Persisted OpenAI configuration blocks, and a wrapper that explains failures
//! through them.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Credential blocks**: OpenAI and Azure OpenAI credentials that resolve to a ready client.
//! - **Model blocks**: text completion and image generation with stored defaults and per-call overrides.
//! - **Block store**: named blocks kept in memory or on disk, secrets included.
//! - **Error interpretation**: wrap a fallible function; when it fails, its error comes back
//!   with a model-written summary appended, same type, original as `source()`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use openai_blocks::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileBlockStore::from_env());
//!     let model = CompletionModel::new(OpenAiCredentials::from_env()?);
//!     store.save_block("curie", &model, true).await?;
//!
//!     let interpreter = ErrorInterpreter::new(store, "curie");
//!     let read = interpreter.wrap(|path: String| std::fs::read_to_string(path))?;
//!     if let Err(e) = read.call("missing.toml".to_string()) {
//!         eprintln!("{e}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod blocks;
pub mod client;
pub mod completion;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod image;
pub mod interpret;
pub mod model_constants;
pub mod runtime;
pub mod settings;
pub mod telemetry;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use blocks::{Block, BlockDocument, BlockStore, BlockStoreExt, FileBlockStore, MemoryBlockStore};
pub use client::OpenAiClient;
pub use completion::CompletionModel;
pub use credentials::{AzureOpenAiCredentials, CredentialsBlock, ModelCredentials, OpenAiCredentials};
pub use error::BlockError;
pub use flow::Task;
pub use image::ImageModel;
pub use interpret::{ErrorInterpreter, ForeignError, InterpretError, InterpretableError};

/// Commonly used items
pub mod prelude {
    pub use crate::auth::{StaticTokenProvider, TokenProvider, register_token_provider};
    pub use crate::blocks::{
        Block, BlockStore, BlockStoreExt, FileBlockStore, MemoryBlockStore,
    };
    pub use crate::completion::CompletionModel;
    pub use crate::credentials::{
        AzureOpenAiCredentials, CredentialsBlock, ModelCredentials, OpenAiCredentials,
    };
    pub use crate::error::BlockError;
    pub use crate::flow::Task;
    pub use crate::image::ImageModel;
    pub use crate::interpret::{
        CapturedFailure, ErrorInterpreter, ForeignError, InterpretError, InterpretableError,
    };
    pub use crate::types::{Completion, HttpConfig, ImageResponse, ImageSize, Params};
}
