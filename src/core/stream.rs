//! Streams over individual resources

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// How a resource is opened by `Archive::open_file`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    /// Read only
    Read,
    /// Truncate and write
    Write,
    /// Read and write in place
    ReadWrite,
    /// Write at the end
    Append,
}

impl FileAccess {
    pub fn reads(self) -> bool {
        matches!(self, FileAccess::Read | FileAccess::ReadWrite)
    }

    pub fn writes(self) -> bool {
        !matches!(self, FileAccess::Read)
    }

    pub(crate) fn open(self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        match self {
            FileAccess::Read => options.read(true),
            FileAccess::Write => options.write(true).truncate(true),
            FileAccess::ReadWrite => options.read(true).write(true),
            FileAccess::Append => options.append(true),
        };
        options.open(path)
    }
}

/// Open resource stream
///
/// Writable sessions hand out the staged file itself, so writes land in the
/// staging area and reach the archive on the next save. Read-only sessions
/// hand out an in-memory copy of the container entry.
#[derive(Debug)]
pub enum ResourceHandle {
    Staged(File),
    Archived(Cursor<Vec<u8>>),
}

impl ResourceHandle {
    pub fn is_staged(&self) -> bool {
        matches!(self, ResourceHandle::Staged(_))
    }
}

impl Read for ResourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ResourceHandle::Staged(file) => file.read(buf),
            ResourceHandle::Archived(cursor) => cursor.read(buf),
        }
    }
}

impl Write for ResourceHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ResourceHandle::Staged(file) => file.write(buf),
            ResourceHandle::Archived(_) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "resource opened from a read-only archive",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ResourceHandle::Staged(file) => file.flush(),
            ResourceHandle::Archived(_) => Ok(()),
        }
    }
}

impl Seek for ResourceHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            ResourceHandle::Staged(file) => file.seek(pos),
            ResourceHandle::Archived(cursor) => cursor.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_flags() {
        assert!(FileAccess::Read.reads() && !FileAccess::Read.writes());
        assert!(!FileAccess::Write.reads() && FileAccess::Write.writes());
        assert!(FileAccess::ReadWrite.reads() && FileAccess::ReadWrite.writes());
        assert!(!FileAccess::Append.reads() && FileAccess::Append.writes());
    }

    #[test]
    fn test_archived_handle_is_read_only() {
        let mut handle = ResourceHandle::Archived(Cursor::new(b"hello".to_vec()));
        let mut out = String::new();
        handle.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert!(handle.write_all(b"x").is_err());
        assert!(!handle.is_staged());
    }

    #[test]
    fn test_staged_append() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("r.bin");
        std::fs::write(&path, b"ab").unwrap();

        let mut handle = ResourceHandle::Staged(FileAccess::Append.open(&path).unwrap());
        handle.write_all(b"cd").unwrap();
        drop(handle);

        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
    }
}
