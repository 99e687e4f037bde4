use crate::owner::{ArchiveId, Capability};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Invalid archive {path:?}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Unsupported format version {found} in {path:?} (this library reads up to version {supported})")]
    VersionMismatch {
        supported: u32,
        found: u64,
        path: PathBuf,
    },

    #[error("Ownership mismatch in {path:?}: node belongs to {actual}, expected {expected}")]
    OwnershipMismatch {
        expected: ArchiveId,
        actual: ArchiveId,
        path: PathBuf,
    },

    #[error("Permission denied: {operation} requires {capability} access to {path:?}")]
    PermissionDenied {
        operation: &'static str,
        capability: Capability,
        path: PathBuf,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid open mode: {0:?} (expected \"r\", \"w\" or \"r+\")")]
    InvalidMode(String),

    #[error("Invalid storage name: {0}")]
    InvalidStorageName(String),

    #[error("Container error: {0}")]
    Container(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Invalid blob: {0}")]
    InvalidBlob(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Blob codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[cfg(feature = "image")]
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

impl ArchiveError {
    pub(crate) fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ArchiveError::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
