//! Named, persisted configuration blocks.
//!
//! A block is a serializable configuration object addressed by its block type
//! slug and a user-chosen name. Stores hold `BlockDocument`s; typed access goes
//! through [`BlockStoreExt`].
//!
//! ```rust,ignore
//! use openai_blocks::blocks::{BlockStoreExt, MemoryBlockStore};
//! use openai_blocks::CompletionModel;
//!
//! let store = MemoryBlockStore::new();
//! store.save_block("curie", &model, false).await?;
//! let model: CompletionModel = store.load_block("curie").await?;
//! ```

mod file;
mod memory;

pub use file::FileBlockStore;
pub use memory::MemoryBlockStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::BlockError;

/// A configuration object that can be saved and loaded by name.
///
/// The default `Serialize` impl of a block masks its secrets; `to_document`
/// is the one place where a block may expose them for persistence.
pub trait Block: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human readable type name, e.g. `"OpenAI Completion Model"`
    const BLOCK_TYPE_NAME: &'static str;
    const LOGO_URL: Option<&'static str> = None;
    const DOCUMENTATION_URL: Option<&'static str> = None;

    fn block_type_slug() -> String {
        slugify(Self::BLOCK_TYPE_NAME)
    }

    /// Data persisted for this block.
    fn to_document(&self) -> Result<Value, BlockError> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_document(data: Value) -> Result<Self, BlockError> {
        Ok(serde_json::from_value(data)?)
    }
}

/// A stored block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    pub id: Uuid,
    pub name: String,
    pub block_type_slug: String,
    pub block_type_name: String,
    pub data: Value,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BlockDocument {
    pub fn new<B: Block>(name: &str, block: &B) -> Result<Self, BlockError> {
        validate_block_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            block_type_slug: B::block_type_slug(),
            block_type_name: B::BLOCK_TYPE_NAME.to_string(),
            data: block.to_document()?,
            created: now,
            updated: now,
        })
    }

    /// Keep identity and creation time of `previous` when overwriting it.
    pub(crate) fn replacing(mut self, previous: &BlockDocument) -> Self {
        self.id = previous.id;
        self.created = previous.created;
        self
    }
}

/// Storage backend for block documents.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Fetch the document stored under `(block_type_slug, name)`.
    ///
    /// Missing documents are reported as [`BlockError::BlockNotFound`].
    async fn read_document(
        &self,
        block_type_slug: &str,
        name: &str,
    ) -> Result<BlockDocument, BlockError>;

    /// Store `document`; fails with [`BlockError::BlockAlreadyExists`] when a
    /// document with the same key exists and `overwrite` is false.
    async fn write_document(
        &self,
        document: BlockDocument,
        overwrite: bool,
    ) -> Result<(), BlockError>;

    async fn delete_document(&self, block_type_slug: &str, name: &str) -> Result<(), BlockError>;

    /// Names stored for a block type, sorted.
    async fn list_names(&self, block_type_slug: &str) -> Result<Vec<String>, BlockError>;
}

/// Typed access on top of any [`BlockStore`].
#[async_trait]
pub trait BlockStoreExt: BlockStore {
    /// Load a block by name.
    async fn load_block<B: Block>(&self, name: &str) -> Result<B, BlockError> {
        let document = self.read_document(&B::block_type_slug(), name).await?;
        B::from_document(document.data)
    }

    /// Save a block under `name`.
    async fn save_block<B: Block>(
        &self,
        name: &str,
        block: &B,
        overwrite: bool,
    ) -> Result<(), BlockError> {
        let document = BlockDocument::new(name, block)?;
        self.write_document(document, overwrite).await?;
        tracing::debug!(block = B::BLOCK_TYPE_NAME, name, "saved block document");
        Ok(())
    }
}

impl<S: BlockStore + ?Sized> BlockStoreExt for S {}

/// Block names are lowercase letters, digits and dashes.
pub fn validate_block_name(name: &str) -> Result<(), BlockError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(BlockError::InvalidParameter(format!(
            "Invalid block name {name:?}: use lowercase letters, numbers and dashes"
        )))
    }
}

/// `"OpenAI Completion Model"` -> `"openai-completion-model"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("OpenAI Completion Model"), "openai-completion-model");
        assert_eq!(slugify("  Azure  OpenAI Credentials "), "azure-openai-credentials");
    }

    #[test]
    fn block_names_are_restricted() {
        assert!(validate_block_name("my-curie-2").is_ok());
        assert!(validate_block_name("").is_err());
        assert!(validate_block_name("My Block").is_err());
        assert!(validate_block_name("../escape").is_err());
    }
}
