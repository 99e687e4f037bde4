//! # bdmp - Book-style document archives
//!
//! `bdmp-rs` reads and writes single-file archives holding a document tree
//! (sections of items) together with the binary resources the items point
//! at, typically images.
//!
//! - **Three open modes**: read (`r`), write-only (`w`) and read-write (`r+`)
//! - **Staged edits**: writable sessions work on plain files and touch the
//!   archive only on `save`
//! - **Atomic saves**: a failed save leaves the previous archive untouched
//! - **Versioned payloads**: files from newer format versions are rejected,
//!   never misread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bdmp_rs::{Archive, OpenMode, Result};
//!
//! # fn main() -> Result<()> {
//! let mut archive = Archive::open("album.bdm", OpenMode::ReadWrite)?;
//! archive.add_file("photos/beach.png", "beach", None)?;
//!
//! let mut doc = archive.document_mut();
//! let mut section = doc.add_section("summer", "chapter", "Summer 2024")?;
//! section.add_item(Some("p1"), "Beach", "First day", "beach", 0)?;
//! if let Some(mut item) = section.item_mut("p1")? {
//!     item.add_metadata("weather", "sunny")?;
//! }
//! drop(doc);
//!
//! archive.save()?;
//! archive.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Builder
//!
//! ```rust,no_run
//! use bdmp_rs::{ArchiveBuilder, EntryCompression, OpenMode, Result};
//!
//! # fn main() -> Result<()> {
//! let archive = ArchiveBuilder::new()
//!     .path("notes.bdm")
//!     .mode(OpenMode::Write)
//!     .display_name("Field notes")
//!     .compression(EntryCompression::Lz4)
//!     .open()?;
//! archive.save()?;
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use core::{
    archive, blob, compression, container, document, encryption, error, owner, payload,
    resource_index, staging, stream, transaction, validation,
};
#[cfg(feature = "image")]
pub(crate) use core::imaging;

pub use crate::core::{
    archive::{Archive, ArchiveOptions},
    blob::Loadable,
    compression::CompressionMethod,
    document::{Document, DocumentMut, Item, ItemMut, Metadata, Section, SectionMut},
    encryption::{generate_key, EncryptionKey},
    error::{ArchiveError, Result},
    owner::{ArchiveId, Capability, OpenMode, OwnerLink},
    payload::FORMAT_VERSION,
    resource_index::{ResourceIndex, DEFAULT_DISPLAY_NAME},
    stream::{FileAccess, ResourceHandle},
    validation::StorageName,
};

/// Compression applied to resource entries inside an archive file
pub use engram_rs::CompressionMethod as EntryCompression;

use std::path::PathBuf;
use tracing::debug;

/// Builder for opening an archive with custom options
///
/// # Examples
///
/// ```rust,no_run
/// use bdmp_rs::{ArchiveBuilder, OpenMode};
///
/// let archive = ArchiveBuilder::new()
///     .path("scratch.bdm")
///     .mode(OpenMode::ReadWrite)
///     .staging_root("/var/tmp/bdmp")
///     .open()?;
/// # Ok::<(), bdmp_rs::ArchiveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    path: Option<PathBuf>,
    mode: OpenMode,
    options: ArchiveOptions,
}

impl ArchiveBuilder {
    /// Start from read-write mode and default options
    pub fn new() -> Self {
        ArchiveBuilder {
            path: None,
            mode: OpenMode::ReadWrite,
            options: ArchiveOptions::default(),
        }
    }

    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Directory under which the session's staging directory is created
    pub fn staging_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.options.staging_root = root.into();
        self
    }

    /// Compression for resource entries written by `save`
    pub fn compression(mut self, method: EntryCompression) -> Self {
        self.options.compression = method;
        self
    }

    /// Display name for a newly created archive; ignored when the file exists
    pub fn display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.options.default_display_name = name.into();
        self
    }

    pub fn open(self) -> Result<Archive> {
        let path = self.path.ok_or_else(|| {
            ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "archive path must be set",
            ))
        })?;

        debug!("Opening {:?} in mode '{}' via builder", path, self.mode);
        Archive::open_with_options(path, self.mode, self.options)
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
