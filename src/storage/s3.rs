use async_trait::async_trait;
use aws_sdk_s3::operation::{get_object::GetObjectError, head_object::HeadObjectError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use super::{validate_key, ObjectStore, StorageError, StorageResult};

/// S3-backed object store.
///
/// Key `company/42/offer.pdf` lives at `s3://{bucket}/{prefix}/company/42/offer.pdf`.
/// Credentials come from the standard AWS environment (variables, profile or IAM role).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3ObjectStore {
    pub async fn new(
        bucket: impl Into<String>,
        prefix: Option<String>,
        endpoint: Option<&str>,
        region: Option<&str>,
    ) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint {
            // MinIO and most S3-compatible services need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(Client::from_conf(builder.build()), bucket, prefix)
    }

    pub fn with_client(
        client: Client,
        bucket: impl Into<String>,
        prefix: Option<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        validate_key(&bucket)?;
        let prefix = prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        if let Some(prefix) = &prefix {
            validate_key(prefix)?;
        }
        Ok(Self {
            client,
            bucket,
            prefix,
        })
    }

    fn object_key(&self, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        })
    }

    async fn head(&self, object_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match e.into_service_error() {
                HeadObjectError::NotFound(_) => Ok(false),
                other => Err(StorageError::Backend(format!("S3 head failed: {other}"))),
            },
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let object_key = self.object_key(key)?;
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {e}")))?;

        debug!(key = %object_key, bucket = %self.bucket, size, "Stored object in S3");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let object_key = self.object_key(key)?;
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetObjectError::NoSuchKey(_) => StorageError::NotFound(key.to_string()),
                other => StorageError::Backend(format!("S3 download failed: {other}")),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 body read failed: {e}")))?
            .into_bytes();
        Ok(data)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let object_key = self.object_key(key)?;
        // S3 deletes are idempotent; check first so a missing object is reported
        if !self.head(&object_key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 delete failed: {e}")))?;

        debug!(key = %object_key, bucket = %self.bucket, "Deleted object from S3");
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("s3://{}/{}", self.bucket, prefix),
            None => format!("s3://{}", self.bucket),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn offline_client() -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-central-1"))
            .endpoint_url("http://127.0.0.1:9")
            .force_path_style(true)
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn keys_are_placed_under_prefix() {
        let store =
            S3ObjectStore::with_client(offline_client(), "crm-docs", Some("/tenant-a/".into()))
                .unwrap();
        assert_eq!(
            store.object_key("company/1/offer.pdf").unwrap(),
            "tenant-a/company/1/offer.pdf"
        );
        assert_eq!(store.describe(), "s3://crm-docs/tenant-a");

        let bare = S3ObjectStore::with_client(offline_client(), "crm-docs", None).unwrap();
        assert_eq!(bare.object_key("a.txt").unwrap(), "a.txt");
        assert_eq!(bare.describe(), "s3://crm-docs");
    }

    #[tokio::test]
    async fn invalid_keys_fail_before_any_request() {
        let store = S3ObjectStore::with_client(offline_client(), "crm-docs", None).unwrap();
        assert!(matches!(
            store.put("../escape", Bytes::new()).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn bucket_name_is_validated() {
        assert!(S3ObjectStore::with_client(offline_client(), "", None).is_err());
    }
}
