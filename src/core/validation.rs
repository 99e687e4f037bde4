//! Validation for internal storage names and archive-relative paths
//!
//! Resource bytes live under `files/<storage name>` inside the container and
//! under `<staging>/files/<storage name>` while an archive is open for writing.
//! A storage name therefore has to be a single, plain path component.

use crate::error::{ArchiveError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Validated internal storage name of a resource
///
/// # Rules
/// - Not empty, not `.` or `..`
/// - None of `/ \ * ? : " < > |` and no line breaks
/// - At most 255 bytes (a single filesystem component)
///
/// # Examples
///
/// ```
/// use bdmp_rs::StorageName;
///
/// let name = StorageName::new("cover.png").unwrap();
/// assert_eq!(name.as_str(), "cover.png");
///
/// assert!(StorageName::new("../escape").is_err());
/// assert!(StorageName::new("a/b.png").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageName(String);

impl StorageName {
    /// Pattern for a plain path component
    const PATTERN: &'static str = r#"^[^/\\*?:"<>|\r\n]+$"#;

    /// Container entry paths are capped at 255 bytes including `files/`
    pub const MAX_LENGTH: usize = 255 - crate::container::FILES_PREFIX.len();

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(StorageName(name))
    }

    /// Generate a fresh random name, keeping the extension of `source` if it has one
    ///
    /// The extension is everything after the last `.` of the file name, so
    /// `photo.final.png` keeps `.png` and `.hidden` keeps `.hidden`.
    pub fn generate_for(source: &Path) -> Result<Self> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let name = match source_extension(source) {
            Some(ext) => format!("{}.{}", token, ext),
            None => token,
        };
        Self::new(name)
    }

    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ArchiveError::InvalidStorageName(
                "storage name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(ArchiveError::InvalidStorageName(format!(
                "storage name too long (max {} bytes)",
                Self::MAX_LENGTH
            )));
        }

        if name == "." || name == ".." {
            return Err(ArchiveError::InvalidStorageName(format!(
                "'{}' is not a file name",
                name
            )));
        }

        let re = Regex::new(Self::PATTERN)
            .map_err(|e| ArchiveError::InvalidStorageName(e.to_string()))?;
        if !re.is_match(name) {
            return Err(ArchiveError::InvalidStorageName(format!(
                "'{}' contains a path separator or reserved character",
                name
            )));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Entry name inside the container
    pub fn entry_name(&self) -> String {
        format!("{}{}", crate::container::FILES_PREFIX, self.0)
    }
}

impl AsRef<str> for StorageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for StorageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StorageName::new(s).map_err(serde::de::Error::custom)
    }
}

/// Extension of a source file: the text after the last `.` in its name
fn source_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Sibling path a file is moved to while it is being replaced
///
/// `/data/notes.bdm` becomes `/data/notes.bdm.old`.
pub fn backup_path(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| ArchiveError::NotFound(format!("{:?} has no file name", target)))?;
    let mut backup = name.to_os_string();
    backup.push(".old");
    Ok(target.with_file_name(backup))
}
