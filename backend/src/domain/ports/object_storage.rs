//! Port for photo object storage.

use async_trait::async_trait;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum StorageError {
        /// The backing store could not be written.
        Io { message: String } =>
            "object store write failed: {message}",
        /// The key contained path components the store rejects.
        InvalidKey { message: String } =>
            "invalid object key: {message}",
    }
}

/// Reference to a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Store-internal key.
    pub key: String,
    /// Public location for the object.
    pub url: String,
}

/// Port for writing uploaded photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` with the given content type.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredObject, StorageError>;
}
