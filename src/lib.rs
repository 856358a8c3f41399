//! Upload core for the campus administration backend
//!
//! Stores inbound files in an S3-compatible bucket under date-partitioned,
//! randomly named keys and hands back the public CDN URL of each object.

pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use config::StorageEndpointConfig;
pub use error::{Error, Result};
pub use key::StorageKey;
pub use models::{UploadRequest, UploadResult};
pub use pipeline::UploadPipeline;
