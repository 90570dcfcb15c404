//! Object storage for uploaded document bytes.
//!
//! Objects are addressed by a path-like key inside a bucket. The database row in `documents`
//! records the key together with the size and SHA-256 checksum of the stored bytes. The
//! backend is picked by `[storage] backend`: a local directory tree or an S3 bucket.

mod local;
mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `key`, overwriting any previous object.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Reads the object stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Removes the object. Missing objects yield [`StorageError::NotFound`].
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Human-readable location of the store, for logs.
    fn describe(&self) -> String;
}

/// Opens the store configured in `[storage]`.
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Local => {
            Arc::new(LocalObjectStore::new(&config.root_dir, &config.bucket).await?)
        }
        StorageBackend::S3 => Arc::new(
            S3ObjectStore::new(
                config.bucket.clone(),
                config.s3_prefix.clone(),
                config.s3_endpoint.as_deref(),
                config.s3_region.as_deref(),
            )
            .await?,
        ),
    };
    info!(backend = ?config.backend, location = %store.describe(), "Document storage ready");
    Ok(store)
}

/// SHA-256 of `data`, hex encoded.
pub fn checksum_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Rejects keys that are empty, absolute, or contain traversal components.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    let bad_component = key
        .split(['/', '\\'])
        .any(|part| part.is_empty() || part == "." || part == "..");
    if bad_component {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_backend_is_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            root_dir: dir.path().to_path_buf(),
            bucket: "docs".into(),
            ..StorageConfig::default()
        };
        let store = open_store(&config).await.unwrap();
        assert!(store.describe().starts_with("file://"));

        store.put("a/b.txt", Bytes::from_static(b"x")).await.unwrap();
        assert!(dir.path().join("docs/a/b.txt").is_file());
    }

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            checksum_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn key_validation() {
        assert!(validate_key("company/abc/offer.pdf").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("a//b").is_err());
    }
}
