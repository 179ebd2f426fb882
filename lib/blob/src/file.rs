use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BlobError;
use crate::traits::BlobStore;

/// FileStore is a BlobStore implementation backed by the local filesystem.
///
/// Keys are mapped to paths under `base_dir`:
///   key "videos/ab12.mp4" → `{base_dir}/videos/ab12.mp4`
///
/// Parent directories are created automatically on `put`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_dir`.
    /// The directory is created if it doesn't exist.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir).map_err(|e| BlobError::Io(e.to_string()))?;
        debug!(dir = %base_dir.display(), "media file store opened");
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path. Rejects empty keys, absolute
    /// paths, and traversal components.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        if key.split(['/', '\\']).any(|part| part == "..") {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(key))
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Some(data))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        let path = self.resolve(key)?;
        Ok(path.is_file())
    }
}
