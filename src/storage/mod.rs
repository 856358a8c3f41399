//! Object storage integration
//!
//! Uploads land in an S3-compatible bucket. Each upload opens its own
//! session, and the session is closed when its [`SessionGuard`] drops.

pub mod client;
pub mod mock;

pub use client::S3Storage;
pub use mock::MockStorage;

use crate::models::ContentStream;
use crate::{Error, Result};
use async_trait::async_trait;
use std::ops::{Deref, DerefMut};
use tokio::io::AsyncReadExt;

/// Upper bound on the buffer reserved up front while reading content.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

pub struct PutObject<'a> {
    pub key: &'a str,
    /// Empty means "not declared"; the header is left to the backend.
    pub content_type: &'a str,
    pub content_length: u64,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn StorageSession>>;
}

#[async_trait]
pub trait StorageSession: Send {
    async fn put_object(&mut self, object: PutObject<'_>) -> Result<()>;

    /// Release the session. Called exactly once, by [`SessionGuard`].
    fn close(&mut self);
}

/// Owns a session and closes it on drop.
pub struct SessionGuard {
    session: Box<dyn StorageSession>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn StorageSession>) -> Self {
        Self { session }
    }
}

impl Deref for SessionGuard {
    type Target = dyn StorageSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.close();
    }
}

/// Read exactly `expected` bytes from `content`.
///
/// The whole body is held in memory before the put, so peak memory per
/// upload equals the declared size. Only the initial reservation is capped,
/// at `MAX_PREALLOCATION`, so a bogus declared size cannot trigger a huge
/// allocation up front. Callers must bound accepted sizes upstream.
///
/// Content that ends early, or keeps going past the declared size, is an
/// upload failure.
pub async fn read_content(content: ContentStream, expected: u64) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(expected.min(MAX_PREALLOCATION) as usize);

    content
        .take(expected.saturating_add(1))
        .read_to_end(&mut body)
        .await
        .map_err(|e| Error::UploadFailed(format!("Failed to read content: {}", e)))?;

    let read = body.len() as u64;
    if read < expected {
        return Err(Error::UploadFailed(format!(
            "Content ended after {} of {} declared bytes",
            read, expected
        )));
    }
    if read > expected {
        return Err(Error::UploadFailed(format!(
            "Content exceeds declared size of {} bytes",
            expected
        )));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn stream(data: &[u8]) -> ContentStream {
        Box::pin(Cursor::new(data.to_vec()))
    }

    struct CountingSession {
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StorageSession for CountingSession {
        async fn put_object(&mut self, _object: PutObject<'_>) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_read_content_exact() {
        let body = read_content(stream(b"abcdef"), 6).await.unwrap();
        assert_eq!(body, b"abcdef");
    }

    #[tokio::test]
    async fn test_read_content_empty() {
        let body = read_content(stream(b""), 0).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_read_content_short() {
        let err = read_content(stream(b"abc"), 10).await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed(ref msg) if msg.contains("3 of 10")));
    }

    #[tokio::test]
    async fn test_read_content_too_long() {
        let err = read_content(stream(b"abcdef"), 4).await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed(ref msg) if msg.contains("exceeds")));
    }

    #[tokio::test]
    async fn test_read_content_huge_declared_size_is_not_preallocated() {
        let err = read_content(stream(b"tiny"), u64::MAX).await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed(ref msg) if msg.contains("4 of")));
    }

    #[test]
    fn test_guard_closes_once_on_drop() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let _guard = SessionGuard::new(Box::new(CountingSession {
                closes: closes.clone(),
            }));
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
