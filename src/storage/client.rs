use super::{ObjectStorage, PutObject, StorageSession};
use crate::config::StorageEndpointConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};
use std::time::Instant;
use tracing::{debug, error, info};

pub struct S3Storage {
    s3_config: aws_sdk_s3::Config,
    bucket: String,
    public_read: bool,
}

impl S3Storage {
    pub async fn new(config: &StorageEndpointConfig) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "campus-storage",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Configured S3 storage"
        );

        Ok(Self {
            s3_config,
            bucket: config.bucket.clone(),
            public_read: config.public_read,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn open_session(&self) -> Result<Box<dyn StorageSession>> {
        Ok(Box::new(S3Session {
            client: Some(S3Client::from_conf(self.s3_config.clone())),
            bucket: self.bucket.clone(),
            public_read: self.public_read,
        }))
    }
}

/// A client dedicated to one upload; dropping it releases its connections.
pub struct S3Session {
    client: Option<S3Client>,
    bucket: String,
    public_read: bool,
}

#[async_trait]
impl StorageSession for S3Session {
    async fn put_object(&mut self, object: PutObject<'_>) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::UploadFailed("Storage session already closed".to_string()))?;

        let content_length = i64::try_from(object.content_length).map_err(|_| {
            Error::UploadFailed(format!(
                "Content length {} is too large",
                object.content_length
            ))
        })?;

        let mut request = client
            .put_object()
            .bucket(&self.bucket)
            .key(object.key)
            .content_length(content_length)
            .body(ByteStream::from(object.body));

        if !object.content_type.is_empty() {
            request = request.content_type(object.content_type);
        }
        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        let start = Instant::now();
        request.send().await.map_err(|e| {
            error!(
                bucket = %self.bucket,
                key = %object.key,
                size_bytes = object.content_length,
                duration_ms = start.elapsed().as_millis() as u64,
                "S3 upload failed: {}",
                DisplayErrorContext(&e)
            );
            Error::UploadFailed(format!(
                "Failed to upload {}: {}",
                object.key,
                DisplayErrorContext(&e)
            ))
        })?;

        info!(
            bucket = %self.bucket,
            key = %object.key,
            size_bytes = object.content_length,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 upload successful"
        );

        Ok(())
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(bucket = %self.bucket, "Closed storage session");
        }
    }
}
