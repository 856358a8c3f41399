//! Upload pipeline: validate, derive key, store, respond.

use crate::config::StorageEndpointConfig;
use crate::key::StorageKey;
use crate::models::{UploadRequest, UploadResult};
use crate::storage::{read_content, ObjectStorage, PutObject, S3Storage, SessionGuard};
use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns inbound files into stored objects and public URLs.
///
/// Calls are independent: each one derives its own key and opens its own
/// storage session, so a single pipeline can serve concurrent uploads.
pub struct UploadPipeline {
    config: Arc<StorageEndpointConfig>,
    storage: Box<dyn ObjectStorage>,
}

impl UploadPipeline {
    /// Build a pipeline backed by the S3 endpoint described in `config`.
    pub async fn new(config: StorageEndpointConfig) -> Result<Self> {
        let storage = S3Storage::new(&config).await?;
        Ok(Self::with_storage(Arc::new(config), Box::new(storage)))
    }

    /// Build a pipeline over any storage backend.
    ///
    /// Mostly useful for tests and dry runs that inject [`crate::storage::MockStorage`].
    pub fn with_storage(
        config: Arc<StorageEndpointConfig>,
        storage: Box<dyn ObjectStorage>,
    ) -> Self {
        Self { config, storage }
    }

    pub fn config(&self) -> &StorageEndpointConfig {
        &self.config
    }

    /// Upload under today's (local) date partition.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult> {
        self.upload_on(request, Local::now().date_naive()).await
    }

    /// Upload under the date partition of `date`.
    ///
    /// Fails with [`Error::InvalidFilename`] before touching storage when the
    /// filename has no extension; every later failure is reported as
    /// [`Error::UploadFailed`]. Nothing is retried.
    pub async fn upload_on(
        &self,
        request: UploadRequest,
        date: NaiveDate,
    ) -> Result<UploadResult> {
        let UploadRequest {
            original_filename,
            content_type,
            size,
            content,
        } = request;

        let key = StorageKey::generate(&original_filename, date)?;

        let result = async {
            let mut session = SessionGuard::new(self.storage.open_session().await?);
            let body = read_content(content, size).await?;

            session
                .put_object(PutObject {
                    key: key.as_str(),
                    content_type: &content_type,
                    content_length: size,
                    body,
                })
                .await?;

            Ok::<(), Error>(())
        }
        .await
        .map_err(Error::into_upload_failure);

        if let Err(e) = result {
            warn!(
                filename = %original_filename,
                key = %key,
                "Upload failed: {}",
                e
            );
            return Err(e);
        }

        let url = self.config.public_url(key.as_str());
        info!(
            filename = %original_filename,
            key = %key,
            size_bytes = size,
            "Stored upload at {}",
            url
        );

        Ok(UploadResult { url, key })
    }
}
