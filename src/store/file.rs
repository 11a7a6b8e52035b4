//! File-backed adapter: one file per entry

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::trace;

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Backend storing each entry as a file under a root directory.
///
/// The encoded key is used as the relative path of the entry, so keys
/// must be valid UTF-8 and free of path traversal. Stacks built through
/// the convenience constructor pair this adapter with an `escape` or
/// `spread` key pipeline, which guarantees both properties; the adapter
/// still validates keys itself since it can be composed freely.
#[derive(Debug)]
pub struct FileAdapter {
    root: PathBuf,
}

impl FileAdapter {
    /// Create a file adapter rooted at `root`, creating the directory
    /// if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory holding the entries
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to the file path holding its entry.
    ///
    /// Rejects keys that are not UTF-8, are empty, are absolute, or
    /// contain `.`/`..` components: anything that could escape the
    /// root or collide with the directory structure.
    fn entry_path(&self, key: &[u8]) -> Result<PathBuf> {
        let key_str = std::str::from_utf8(key).map_err(|_| StoreError::InvalidKey {
            message: "file adapter keys must be valid UTF-8".to_string(),
        })?;
        if key_str.is_empty() {
            return Err(StoreError::InvalidKey {
                message: "file adapter keys must not be empty".to_string(),
            });
        }

        let relative = Path::new(key_str);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::InvalidKey {
                message: format!("key '{key_str}' is not a safe relative path"),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Store for FileAdapter {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let path = self.entry_path(key)?;
        match fs::read(&path).await {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        if ttl.is_some() {
            return Err(StoreError::TtlUnsupported {
                adapter: "file".to_string(),
            });
        }

        let path = self.entry_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &value).await?;
        trace!(path = %path.display(), bytes = value.len(), "wrote entry");
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.root).await?;
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn exists(&self, key: &[u8]) -> Result<bool> {
        let path = self.entry_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
