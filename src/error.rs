//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid filename '{0}': no file extension")]
    InvalidFilename(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fold any error into `UploadFailed`, keeping its description.
    pub fn into_upload_failure(self) -> Self {
        match self {
            Error::UploadFailed(_) | Error::InvalidFilename(_) => self,
            other => Error::UploadFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
