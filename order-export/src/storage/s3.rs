//! S3-backed object store

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;

use super::{ObjectStore, StoreError, UploadTarget};
use crate::config::StoreConfig;

/// [`ObjectStore`] writing through `PutObject`
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build the client from the standard AWS credential chain and our region
    pub async fn from_config(config: &StoreConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, target: &UploadTarget, body: Vec<u8>) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .body(ByteStream::from(body))
            .content_type(&target.content_type)
            .send()
            .await
            .map_err(|e| StoreError::Upload {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
