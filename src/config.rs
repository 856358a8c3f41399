//! Storage endpoint configuration
//!
//! Loaded once at startup from the environment (a `.env` file is honored)
//! and shared read-only by every upload afterwards.

use crate::{Error, Result};
use std::fmt;

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, PartialEq, Eq)]
pub struct StorageEndpointConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    /// Public base URL, stored without a trailing slash.
    pub cdn_domain: String,
    pub access_key: String,
    pub secret_key: String,
    pub force_path_style: bool,
    pub public_read: bool,
}

impl StorageEndpointConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", name)))
        };

        Ok(Self {
            endpoint: required("STORAGE_ENDPOINT")?,
            region: lookup("STORAGE_REGION")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: required("STORAGE_BUCKET")?,
            cdn_domain: required("STORAGE_CDN_DOMAIN")?
                .trim_end_matches('/')
                .to_string(),
            access_key: required("STORAGE_ACCESS_KEY")?,
            secret_key: required("STORAGE_SECRET_KEY")?,
            force_path_style: parse_flag("STORAGE_FORCE_PATH_STYLE", &lookup)?,
            public_read: parse_flag("STORAGE_PUBLIC_READ", &lookup)?,
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn_domain, key)
    }
}

fn parse_flag<F>(name: &str, lookup: &F) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(Error::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

// Hand-written so the secret key never reaches the logs.
impl fmt::Debug for StorageEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEndpointConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("cdn_domain", &self.cdn_domain)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .field("public_read", &self.public_read)
            .finish()
    }
}
