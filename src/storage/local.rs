use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use super::{validate_key, ObjectStore, StorageError, StorageResult};

/// Filesystem-backed object store.
///
/// Key `company/42/offer.pdf` in bucket `documents` lives at
/// `{root_dir}/documents/company/42/offer.pdf`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    /// Creates the bucket directory if it doesn't exist.
    pub async fn new(root_dir: impl AsRef<Path>, bucket: &str) -> StorageResult<Self> {
        validate_key(bucket)?;
        let base_path = root_dir.as_ref().join(bucket);
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

fn map_not_found(key: &str, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // temp file + rename so readers never see a partial object
        let temp_path = path.with_extension("part");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(key, size = data.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.path_for(key)?;
        let data = fs::read(&path).await.map_err(|e| map_not_found(key, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| map_not_found(key, e))?;
        debug!(key, "Deleted object");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.base_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path(), "documents").await.unwrap();

        store
            .put("c1/offer.pdf", Bytes::from_static(b"%PDF-1.3"))
            .await
            .unwrap();
        assert!(dir.path().join("documents/c1/offer.pdf").is_file());
        assert_eq!(
            store.get("c1/offer.pdf").await.unwrap(),
            Bytes::from_static(b"%PDF-1.3")
        );

        store.delete("c1/offer.pdf").await.unwrap();
        assert!(!dir.path().join("documents/c1/offer.pdf").exists());
    }

    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path(), "documents").await.unwrap();

        assert!(matches!(
            store.get("nope").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("nope").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path(), "documents").await.unwrap();
        assert!(matches!(
            store.put("../escape", Bytes::new()).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
