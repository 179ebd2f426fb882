use crate::error::BlobError;

/// BlobStore holds the uploaded media bytes (video files, thumbnails,
/// avatars) the rest of the system only ever references by key.
///
/// Keys are path-like strings: `videos/ab12...f9.mp4`,
/// `thumbnails/ab12...f9.png`. The default implementation
/// ([`crate::FileStore`]) maps keys to local filesystem paths; a remote
/// object-storage backend would implement this same trait. Record CRUD
/// consumes the key as an opaque reference and issues `delete` when the
/// owning record is removed.
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
