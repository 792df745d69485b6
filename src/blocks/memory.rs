use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{BlockDocument, BlockStore};
use crate::error::BlockError;

/// Process-local block store.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    documents: RwLock<HashMap<(String, String), BlockDocument>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn read_document(
        &self,
        block_type_slug: &str,
        name: &str,
    ) -> Result<BlockDocument, BlockError> {
        let documents = self.documents.read().await;
        documents
            .get(&(block_type_slug.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| BlockError::BlockNotFound {
                block_type: block_type_slug.to_string(),
                name: name.to_string(),
            })
    }

    async fn write_document(
        &self,
        document: BlockDocument,
        overwrite: bool,
    ) -> Result<(), BlockError> {
        let key = (document.block_type_slug.clone(), document.name.clone());
        let mut documents = self.documents.write().await;
        let document = match documents.get(&key) {
            Some(_) if !overwrite => {
                return Err(BlockError::BlockAlreadyExists {
                    block_type: key.0,
                    name: key.1,
                });
            }
            Some(previous) => document.replacing(previous),
            None => document,
        };
        documents.insert(key, document);
        Ok(())
    }

    async fn delete_document(&self, block_type_slug: &str, name: &str) -> Result<(), BlockError> {
        let mut documents = self.documents.write().await;
        documents
            .remove(&(block_type_slug.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| BlockError::BlockNotFound {
                block_type: block_type_slug.to_string(),
                name: name.to_string(),
            })
    }

    async fn list_names(&self, block_type_slug: &str) -> Result<Vec<String>, BlockError> {
        let documents = self.documents.read().await;
        let mut names: Vec<String> = documents
            .keys()
            .filter(|(slug, _)| slug == block_type_slug)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
