//! Storage key derivation
//!
//! Keys look like `YYYY/MM/DD/<uuid><extension>`: a date partition taken from
//! the upload date, a random v4 UUID and the original file extension.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive a fresh key for `filename` uploaded on `date`.
    ///
    /// Uniqueness rests entirely on the random identifier; existing objects
    /// are never consulted.
    pub fn generate(filename: &str, date: NaiveDate) -> Result<Self> {
        let extension = extract_extension(filename)?;
        Ok(Self(format!(
            "{}/{}{}",
            date_prefix(date),
            Uuid::new_v4(),
            extension
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything from the last `.` to the end of `filename`, dot included.
///
/// A trailing lone dot yields `"."`.
pub fn extract_extension(filename: &str) -> Result<&str> {
    filename
        .rfind('.')
        .map(|idx| &filename[idx..])
        .ok_or_else(|| Error::InvalidFilename(filename.to_string()))
}

pub fn date_prefix(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
