//! Versioned payload envelope
//!
//! The document tree and the resource index are each stored as one JSON
//! object carrying a `version` field next to the structural content:
//!
//! ```text
//! { "version": 2, "name": "NoName", "files": { "img1": "9f1c...e2.png" } }
//! ```
//!
//! Decoding reads the version before the body. A version above
//! [`FORMAT_VERSION`] is rejected with `VersionMismatch`; a payload that is not
//! a JSON object, lacks a version, or does not match the expected shape is
//! rejected with `InvalidFile`. Older versions are decoded straight into the
//! current structures.

use crate::error::{ArchiveError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Highest payload version this library reads and the version it writes
pub const FORMAT_VERSION: u32 = 2;

const VERSION_FIELD: &str = "version";

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    version: u32,
    #[serde(flatten)]
    body: &'a T,
}

/// Encode `body` with the current format version
pub fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        body,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a payload named `what` read from the archive at `path`
pub fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str, path: &Path) -> Result<T> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ArchiveError::invalid_file(path, format!("Invalid '{}' payload: {}", what, e)))?;

    let object = value.as_object().ok_or_else(|| {
        ArchiveError::invalid_file(path, format!("Invalid '{}' payload: not an object", what))
    })?;

    let found = object
        .get(VERSION_FIELD)
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| {
            ArchiveError::invalid_file(
                path,
                format!("Invalid '{}' payload: missing format version", what),
            )
        })?;

    if found > u64::from(FORMAT_VERSION) {
        return Err(ArchiveError::VersionMismatch {
            supported: FORMAT_VERSION,
            found,
            path: path.to_path_buf(),
        });
    }

    serde_json::from_value(value)
        .map_err(|e| ArchiveError::invalid_file(path, format!("Invalid '{}' payload: {}", what, e)))
}
