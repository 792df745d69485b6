use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{BlockDocument, BlockStore, validate_block_name};
use crate::error::BlockError;
use crate::settings::StoreSettings;

/// Block store backed by one JSON file per document:
/// `{root}/{block_type_slug}/{name}.json`.
///
/// Documents contain plaintext secrets, so files are created owner-only on unix.
#[derive(Debug, Clone)]
pub struct FileBlockStore {
    root: PathBuf,
}

impl FileBlockStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.home.clone())
    }

    /// Store rooted at `OPENAI_BLOCKS_HOME` (or the default home).
    pub fn from_env() -> Self {
        Self::from_settings(&StoreSettings::from_env())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, block_type_slug: &str, name: &str) -> Result<PathBuf, BlockError> {
        validate_block_name(block_type_slug)?;
        validate_block_name(name)?;
        Ok(self.root.join(block_type_slug).join(format!("{name}.json")))
    }

    fn not_found(block_type_slug: &str, name: &str) -> BlockError {
        BlockError::BlockNotFound {
            block_type: block_type_slug.to_string(),
            name: name.to_string(),
        }
    }
}

async fn write_temp(tmp: &Path, bytes: &[u8]) -> Result<(), BlockError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl BlockStore for FileBlockStore {
    async fn read_document(
        &self,
        block_type_slug: &str,
        name: &str,
    ) -> Result<BlockDocument, BlockError> {
        let path = self.path_for(block_type_slug, name)?;
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Self::not_found(block_type_slug, name));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_document(
        &self,
        document: BlockDocument,
        overwrite: bool,
    ) -> Result<(), BlockError> {
        let path = self.path_for(&document.block_type_slug, &document.name)?;
        let document = if overwrite {
            match self
                .read_document(&document.block_type_slug, &document.name)
                .await
            {
                Ok(previous) => document.replacing(&previous),
                Err(e) if e.is_not_found() => document,
                Err(e) => return Err(e),
            }
        } else {
            document
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&document)?;
        let tmp = path.with_file_name(format!(".{}.{}.tmp", document.name, Uuid::new_v4()));

        let result = match write_temp(&tmp, &bytes).await {
            Ok(()) if overwrite => tokio::fs::rename(&tmp, &path).await.map_err(BlockError::from),
            // Linking fails if the name is taken, so concurrent creators cannot both win.
            Ok(()) => match tokio::fs::hard_link(&tmp, &path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    Err(BlockError::BlockAlreadyExists {
                        block_type: document.block_type_slug.clone(),
                        name: document.name.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        // After a rename the temp file is gone and removal fails harmlessly.
        let _ = tokio::fs::remove_file(&tmp).await;
        result
    }

    async fn delete_document(&self, block_type_slug: &str, name: &str) -> Result<(), BlockError> {
        let path = self.path_for(block_type_slug, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(block_type_slug, name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_names(&self, block_type_slug: &str) -> Result<Vec<String>, BlockError> {
        validate_block_name(block_type_slug)?;
        let dir = self.root.join(block_type_slug);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
