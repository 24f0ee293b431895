//! Filesystem object storage for uploaded photos.
//!
//! Uses a capability-scoped `cap_std::fs::Dir`, so the adapter can only
//! write inside the configured media directory regardless of what key it is
//! handed; traversal components are rejected before touching the
//! filesystem.

use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::Dir;

use crate::domain::ports::{ObjectStorage, StorageError, StoredObject};

/// Object store writing into a capability-scoped directory.
#[derive(Clone)]
pub struct DirObjectStorage {
    dir: Arc<Dir>,
    public_base: String,
}

impl DirObjectStorage {
    /// Open the media directory and build the store.
    ///
    /// `public_base` is the URL prefix under which stored keys are served,
    /// e.g. `/media`.
    pub fn open(
        path: &std::path::Path,
        public_base: impl Into<String>,
    ) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)
            .map_err(|err| StorageError::io(format!("creating media directory: {err}")))?;
        let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
            .map_err(|err| StorageError::io(format!("opening media directory: {err}")))?;
        Ok(Self {
            dir: Arc::new(dir),
            public_base: public_base.into(),
        })
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::invalid_key("key must not be empty"));
        }
        if key.starts_with('/') {
            return Err(StorageError::invalid_key("key must be relative"));
        }
        if key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(StorageError::invalid_key(format!(
                "key contains traversal components: {key}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for DirObjectStorage {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredObject, StorageError> {
        Self::validate_key(key)?;

        if let Some((parent, _file)) = key.rsplit_once('/') {
            self.dir
                .create_dir_all(parent)
                .map_err(|err| StorageError::io(format!("creating {parent}: {err}")))?;
        }
        self.dir
            .write(key, bytes)
            .map_err(|err| StorageError::io(format!("writing {key}: {err}")))?;

        Ok(StoredObject {
            key: key.to_owned(),
            url: format!("{}/{key}", self.public_base),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn store() -> (DirObjectStorage, tempfile::TempDir) {
        let tmp = tempfile::tempdir().expect("temp dir");
        let storage = DirObjectStorage::open(tmp.path(), "/media").expect("open store");
        (storage, tmp)
    }

    #[tokio::test]
    async fn stores_bytes_under_nested_keys() {
        let (storage, tmp) = store();
        let stored = storage
            .put("photos/fido.jpg", "image/jpeg", b"fake-jpeg")
            .await
            .expect("stored");

        assert_eq!(stored.key, "photos/fido.jpg");
        assert_eq!(stored.url, "/media/photos/fido.jpg");
        let on_disk = std::fs::read(tmp.path().join("photos/fido.jpg")).expect("file exists");
        assert_eq!(on_disk, b"fake-jpeg");
    }

    #[rstest]
    #[case("")]
    #[case("/absolute.jpg")]
    #[case("../escape.jpg")]
    #[case("photos/../../escape.jpg")]
    #[case("photos//double.jpg")]
    #[tokio::test]
    async fn traversal_keys_are_rejected(#[case] key: &str) {
        let (storage, _tmp) = store();
        let err = storage
            .put(key, "image/jpeg", b"data")
            .await
            .expect_err("key rejected");
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
