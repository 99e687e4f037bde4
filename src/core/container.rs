//! Container I/O for archive files
//!
//! An archive file is an engram container with two required top-level
//! entries and one entry per attached resource:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ data            (document)   │
//! │ info            (res. index) │
//! │ files/<storage name>   ...   │
//! └──────────────────────────────┘
//! ```

use crate::error::{ArchiveError, Result};
use crate::validation::StorageName;
use engram_rs::{ArchiveReader, ArchiveWriter, CompressionMethod};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Entry holding the serialized document tree
pub const DATA_ENTRY: &str = "data";

/// Entry holding the serialized resource index
pub const INFO_ENTRY: &str = "info";

/// Namespace for resource entries
pub const FILES_PREFIX: &str = "files/";

/// Entries every valid archive must contain
pub const REQUIRED_ENTRIES: [&str; 2] = [INFO_ENTRY, DATA_ENTRY];

/// Raw payloads of the two required entries
#[derive(Debug, Clone)]
pub struct Payloads {
    pub data: Vec<u8>,
    pub info: Vec<u8>,
}

/// Read side of an archive file
pub struct ContainerReader {
    reader: ArchiveReader,
    path: PathBuf,
}

impl ContainerReader {
    /// Open a container, failing with `InvalidFile` if it is not one
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = ArchiveReader::open_and_init(path).map_err(|e| {
            ArchiveError::invalid_file(path, format!("Not a recognized container: {}", e))
        })?;

        Ok(ContainerReader {
            reader,
            path: path.to_path_buf(),
        })
    }

    /// Open a container and check that both required entries are present
    pub fn open_validated<P: AsRef<Path>>(path: P) -> Result<(Self, Payloads)> {
        let mut container = Self::open(path)?;
        let info = container.read_required(INFO_ENTRY)?;
        let data = container.read_required(DATA_ENTRY)?;
        debug!(
            "Validated container {:?} ({} byte document, {} byte index)",
            container.path,
            data.len(),
            info.len()
        );
        Ok((container, Payloads { data, info }))
    }

    fn read_required(&mut self, entry: &str) -> Result<Vec<u8>> {
        self.reader
            .read_file(entry)
            .map_err(|_| ArchiveError::invalid_file(&self.path, format!("Missing '{}'", entry)))
    }

    /// Read the bytes of one resource entry
    pub fn read_resource(&mut self, name: &StorageName) -> Result<Vec<u8>> {
        let entry = name.entry_name();
        self.reader.read_file(&entry).map_err(|_| {
            ArchiveError::invalid_file(&self.path, format!("Missing resource entry '{}'", entry))
        })
    }

    /// Storage names of every resource entry in the container
    ///
    /// Entries under `files/` whose remainder is not a valid storage name are
    /// skipped with a warning.
    pub fn resource_names(&self) -> Vec<StorageName> {
        self.reader
            .list_files()
            .iter()
            .filter_map(|entry| entry.strip_prefix(FILES_PREFIX))
            .filter_map(|rest| match StorageName::new(rest) {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!("Skipping resource entry {:?} in {:?}: {}", rest, self.path, e);
                    None
                }
            })
            .collect()
    }

    pub fn contains_resource(&self, name: &StorageName) -> bool {
        self.reader.contains(&name.entry_name())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write side of an archive file
///
/// The file at the target path is created by [`ContainerWriter::create`] and
/// only complete once [`ContainerWriter::finalize`] returns.
pub struct ContainerWriter {
    writer: ArchiveWriter,
    path: PathBuf,
    compression: CompressionMethod,
}

impl ContainerWriter {
    pub fn create<P: AsRef<Path>>(path: P, compression: CompressionMethod) -> Result<Self> {
        let path = path.as_ref();
        let writer = ArchiveWriter::create(path).map_err(|e| {
            ArchiveError::Container(format!("Failed to create container {:?}: {}", path, e))
        })?;

        Ok(ContainerWriter {
            writer,
            path: path.to_path_buf(),
            compression,
        })
    }

    /// Add one of the required payload entries
    pub fn add_payload(&mut self, entry: &str, bytes: &[u8]) -> Result<()> {
        self.writer
            .add_file_with_compression(entry, bytes, CompressionMethod::Zstd)
            .map_err(|e| {
                ArchiveError::Container(format!(
                    "Failed to add '{}' to {:?}: {}",
                    entry, self.path, e
                ))
            })
    }

    /// Add a resource entry under the `files/` namespace
    pub fn add_resource(&mut self, name: &StorageName, bytes: &[u8]) -> Result<()> {
        let entry = name.entry_name();
        self.writer
            .add_file_with_compression(&entry, bytes, self.compression)
            .map_err(|e| {
                ArchiveError::Container(format!(
                    "Failed to add '{}' to {:?}: {}",
                    entry, self.path, e
                ))
            })
    }

    pub fn finalize(self) -> Result<()> {
        #[allow(unused_mut)]
        let ContainerWriter {
            mut writer, path, ..
        } = self;
        writer.finalize().map_err(|e| {
            ArchiveError::Container(format!("Failed to finalize container {:?}: {}", path, e))
        })
    }
}
