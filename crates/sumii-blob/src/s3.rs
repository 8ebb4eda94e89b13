use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::instrument;

use crate::error::{BlobError, Result};
use crate::BlobStore;

/// S3-backed store. Works against any S3-compatible endpoint (the gateway
/// config's `blob.endpoint_url` lets this point at a self-hosted MinIO in
/// dev, the same way other HTTP adapters in this codebase take a configurable
/// `base_url`).
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub async fn new(bucket: impl Into<String>, endpoint_url: Option<&str>, region: &str) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(
            aws_config::Region::new(region.to_string()),
        );
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let shared_config = loader.load().await;
        let client = Client::new(&shared_config);
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, bytes))]
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::NotFound(format!("{key}: {e}")))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?
            .into_bytes();
        Ok(bytes.to_vec())
    }

    #[instrument(skip(self))]
    async fn presigned_url(&self, key: &str, expiry: Duration) -> Result<String> {
        let config = PresigningConfig::expires_in(expiry).map_err(|e| BlobError::Backend(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;
        Ok(())
    }
}
