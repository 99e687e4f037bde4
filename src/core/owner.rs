//! Open modes and the ownership link carried by every document node
//!
//! Nodes never hold a reference to their archive. Instead each one carries an
//! [`OwnerLink`]: the opaque id of the archive session it was built under, the
//! session's open mode, and the archive path for error messages. Permission
//! checks read the mode; insertion checks compare ids.

use crate::error::{ArchiveError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ARCHIVE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of one open archive session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchiveId(u64);

impl ArchiveId {
    pub(crate) fn next() -> Self {
        ArchiveId(NEXT_ARCHIVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "archive#{}", self.0)
    }
}

/// Access capability checked before an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Read => f.write_str("read"),
            Capability::Write => f.write_str("write"),
        }
    }
}

/// Mode an archive is opened in
///
/// | tag  | mode        | readable | writable |
/// |------|-------------|----------|----------|
/// | `r`  | `Read`      | yes      | no       |
/// | `w`  | `Write`     | no       | yes      |
/// | `r+` | `ReadWrite` | yes      | yes      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

impl OpenMode {
    pub fn is_readable(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::ReadWrite)
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::ReadWrite => "r+",
        }
    }
}

impl FromStr for OpenMode {
    type Err = ArchiveError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "r" => Ok(OpenMode::Read),
            "w" => Ok(OpenMode::Write),
            "r+" => Ok(OpenMode::ReadWrite),
            other => Err(ArchiveError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Link from a node back to the archive session that owns it
///
/// Two links are equal when they point at the same session, regardless of
/// how they were obtained.
#[derive(Debug, Clone)]
pub struct OwnerLink {
    archive: ArchiveId,
    mode: OpenMode,
    path: Arc<PathBuf>,
}

impl OwnerLink {
    pub(crate) fn new(archive: ArchiveId, mode: OpenMode, path: PathBuf) -> Self {
        OwnerLink {
            archive,
            mode,
            path: Arc::new(path),
        }
    }

    pub fn archive(&self) -> ArchiveId {
        self.archive
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_readable(&self) -> bool {
        self.mode.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.mode.is_writable()
    }

    pub(crate) fn ensure_readable(&self, operation: &'static str) -> Result<()> {
        if self.is_readable() {
            Ok(())
        } else {
            Err(self.denied(operation, Capability::Read))
        }
    }

    pub(crate) fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.is_writable() {
            Ok(())
        } else {
            Err(self.denied(operation, Capability::Write))
        }
    }

    /// Reject a node built under a different archive session
    pub(crate) fn ensure_owns(&self, other: &OwnerLink) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(ArchiveError::OwnershipMismatch {
                expected: self.archive,
                actual: other.archive,
                path: self.path.to_path_buf(),
            })
        }
    }

    fn denied(&self, operation: &'static str, capability: Capability) -> ArchiveError {
        ArchiveError::PermissionDenied {
            operation,
            capability,
            path: self.path.to_path_buf(),
        }
    }
}

impl PartialEq for OwnerLink {
    fn eq(&self, other: &Self) -> bool {
        self.archive == other.archive
    }
}

impl Eq for OwnerLink {}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(mode: OpenMode) -> OwnerLink {
        OwnerLink::new(ArchiveId::next(), mode, PathBuf::from("test.bdm"))
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("r".parse::<OpenMode>().unwrap(), OpenMode::Read);
        assert_eq!("w".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert_eq!("r+".parse::<OpenMode>().unwrap(), OpenMode::ReadWrite);

        for bad in ["", "rw", "a", "w+", "R"] {
            let err = bad.parse::<OpenMode>().unwrap_err();
            assert!(matches!(err, ArchiveError::InvalidMode(ref tag) if tag == bad));
        }
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(OpenMode::Read.is_readable());
        assert!(!OpenMode::Read.is_writable());
        assert!(!OpenMode::Write.is_readable());
        assert!(OpenMode::Write.is_writable());
        assert!(OpenMode::ReadWrite.is_readable());
        assert!(OpenMode::ReadWrite.is_writable());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ArchiveId::next();
        let b = ArchiveId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_link_equality_is_by_session() {
        let a = link(OpenMode::ReadWrite);
        let copy = a.clone();
        let b = link(OpenMode::ReadWrite);

        assert_eq!(a, copy);
        assert_ne!(a, b);
        assert!(a.ensure_owns(&copy).is_ok());

        match a.ensure_owns(&b) {
            Err(ArchiveError::OwnershipMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, a.archive());
                assert_eq!(actual, b.archive());
            }
            other => panic!("expected ownership mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_permission_checks() {
        let read_only = link(OpenMode::Read);
        assert!(read_only.ensure_readable("read").is_ok());
        assert!(matches!(
            read_only.ensure_writable("write"),
            Err(ArchiveError::PermissionDenied {
                capability: Capability::Write,
                ..
            })
        ));

        let write_only = link(OpenMode::Write);
        assert!(matches!(
            write_only.ensure_readable("read"),
            Err(ArchiveError::PermissionDenied {
                capability: Capability::Read,
                ..
            })
        ));
    }
}
