//! Data models for upload requests and results

use crate::key::StorageKey;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub type ContentStream = Pin<Box<dyn AsyncRead + Send>>;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One inbound file, as handed over by the multipart layer.
pub struct UploadRequest {
    pub original_filename: String,
    /// May be empty when the client did not declare one.
    pub content_type: String,
    pub size: u64,
    pub content: ContentStream,
}

impl UploadRequest {
    pub fn new(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        content: impl AsyncRead + Send + 'static,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type: content_type.into(),
            size,
            content: Box::pin(content),
        }
    }

    pub fn from_bytes(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        let size = data.len() as u64;
        Self::new(original_filename, content_type, size, Cursor::new(data))
    }

    /// Open a local file, guessing its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        let original_filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE);

        Ok(Self::new(original_filename, content_type, size, file))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("original_filename", &self.original_filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
    pub key: StorageKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_from_bytes_sets_size() {
        let mut request = UploadRequest::from_bytes("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(request.size, 5);

        let mut buf = Vec::new();
        request.content.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello");
    }

    #[tokio::test]
    async fn test_from_path_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7")
            .unwrap();

        let request = UploadRequest::from_path(&path).await.unwrap();
        assert_eq!(request.original_filename, "transcript.pdf");
        assert_eq!(request.content_type, "application/pdf");
        assert_eq!(request.size, 8);
    }

    #[tokio::test]
    async fn test_from_path_unknown_extension_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.zzunknown");
        std::fs::write(&path, b"abc").unwrap();

        let request = UploadRequest::from_path(&path).await.unwrap();
        assert_eq!(request.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = UploadRequest::from_path("/definitely/not/here.txt").await;
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_upload_result_serialization() {
        let result = UploadResult {
            url: "https://cdn.example.com/2025/08/14/a.pdf".to_string(),
            key: serde_json::from_str("\"2025/08/14/a.pdf\"").unwrap(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"url":"https://cdn.example.com/2025/08/14/a.pdf","key":"2025/08/14/a.pdf"}"#
        );
    }
}
