//! Archive handle
//!
//! An [`Archive`] is one open session over an archive file. The document
//! tree and resource index are loaded into memory on open. Writable sessions
//! also get a private [`Staging`] directory holding every resource as a plain
//! file; `save` rebuilds the container from the in-memory payloads plus the
//! staged files and swaps it into place atomically.
//!
//! ```text
//! open("book.bdm", r+)
//!   ├─ validate container (data + info present)
//!   ├─ import document / resource index
//!   └─ extract files/* entries ──► staging/files/<storage name>
//!
//! save()
//!   ├─ book.bdm ──rename──► book.bdm.old
//!   ├─ write new book.bdm from memory + staging
//!   └─ ok: delete .old │ err: delete partial, restore .old
//! ```

use crate::container::{ContainerReader, ContainerWriter, DATA_ENTRY, INFO_ENTRY};
use crate::document::{Document, DocumentMut, Item, Section};
use crate::error::{ArchiveError, Result};
use crate::owner::{ArchiveId, Capability, OpenMode, OwnerLink};
use crate::resource_index::{ResourceIndex, DEFAULT_DISPLAY_NAME};
use crate::staging::Staging;
use crate::stream::{FileAccess, ResourceHandle};
use crate::transaction::ReplaceTransaction;
use crate::validation::StorageName;
use engram_rs::CompressionMethod;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Tunables applied when an archive is opened
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Directory under which per-session staging directories are created
    pub staging_root: PathBuf,
    /// Compression used for resource entries (payload entries always use zstd)
    pub compression: CompressionMethod,
    /// Display name given to newly created archives
    pub default_display_name: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            staging_root: std::env::temp_dir(),
            compression: CompressionMethod::None,
            default_display_name: DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

/// An open archive session
pub struct Archive {
    path: PathBuf,
    mode: OpenMode,
    owner: OwnerLink,
    options: ArchiveOptions,
    staging: Option<Staging>,
    document: Document,
    index: ResourceIndex,
}

impl Archive {
    /// Open or create an archive with default options
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with_options(path, mode, ArchiveOptions::default())
    }

    /// Open or create an archive
    ///
    /// An existing file is validated before anything else happens, so a
    /// corrupt file fails with `InvalidFile` in every mode. A missing file is
    /// an error in read mode and starts an empty archive otherwise; nothing is
    /// written to disk until [`Archive::save`].
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let owner = OwnerLink::new(ArchiveId::next(), mode, path.clone());

        let container = if path.exists() {
            Some(ContainerReader::open_validated(&path)?)
        } else if mode.is_writable() {
            None
        } else {
            return Err(ArchiveError::NotFound(format!("archive {:?}", path)));
        };

        let (document, index, mut reader) = match container {
            Some((reader, payloads)) => (
                Document::import(&payloads.data, &owner)?,
                ResourceIndex::import(&payloads.info, &owner)?,
                Some(reader),
            ),
            None => (
                Document::empty(&owner),
                ResourceIndex::empty(&owner, options.default_display_name.clone()),
                None,
            ),
        };

        let staging = if mode.is_writable() {
            let staging = Staging::create(&options.staging_root)?;
            if let Some(reader) = reader.as_mut() {
                if let Some(missing) = index
                    .storage_names()
                    .find(|name| !reader.contains_resource(name))
                {
                    return Err(ArchiveError::invalid_file(
                        &path,
                        format!("Missing resource entry '{}'", missing.entry_name()),
                    ));
                }
                let names = reader.resource_names();
                staging.extract(reader, &names)?;
            }
            Some(staging)
        } else {
            None
        };

        info!(
            "Opened archive {:?} in mode '{}' ({}, {} resources)",
            path,
            mode,
            owner.archive(),
            index.len()
        );

        Ok(Archive {
            path,
            mode,
            owner,
            options,
            staging,
            document,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_readable(&self) -> bool {
        self.mode.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.mode.is_writable()
    }

    /// Ownership link shared by every node of this session
    pub fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Guarded mutable access to the document tree
    pub fn document_mut(&mut self) -> DocumentMut<'_> {
        DocumentMut::new(&mut self.document)
    }

    pub fn resources(&self) -> &ResourceIndex {
        &self.index
    }

    pub fn display_name(&self) -> &str {
        self.index.display_name()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.index.set_display_name(name)
    }

    /// Staging directory of a writable session
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging.as_ref().map(Staging::root)
    }

    /// Build a detached section owned by this session
    pub fn new_section(&self, kind: impl Into<String>, description: impl Into<String>) -> Section {
        Section::new(&self.owner, kind, description)
    }

    /// Build a detached item owned by this session
    pub fn new_item(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        resource_id: impl Into<String>,
        level: i64,
    ) -> Item {
        Item::new(&self.owner, title, content, resource_id, level)
    }

    pub fn file_ids(&self) -> impl Iterator<Item = &str> {
        self.index.iter().map(|(id, _)| id)
    }

    pub fn contains_file(&self, external_id: &str) -> bool {
        self.index.contains(external_id)
    }

    /// Copy a file into the archive under `external_id`
    ///
    /// The storage name defaults to a random hex name keeping the source
    /// extension. On failure the index is left as it was.
    pub fn add_file<P: AsRef<Path>>(
        &mut self,
        source: P,
        external_id: &str,
        internal_name: Option<&str>,
    ) -> Result<()> {
        self.owner.ensure_writable("add file")?;
        let source = source.as_ref();

        if !source.is_file() {
            return Err(ArchiveError::NotFound(format!("source file {:?}", source)));
        }
        if self.index.contains(external_id) {
            return Err(ArchiveError::AlreadyExists(format!(
                "file id '{}'",
                external_id
            )));
        }

        let name = match internal_name {
            Some(name) => StorageName::new(name)?,
            None => StorageName::generate_for(source)?,
        };
        if self.index.storage_names().any(|existing| existing == &name) {
            return Err(ArchiveError::AlreadyExists(format!("storage name '{}'", name)));
        }

        let bytes = fs::read(source)?;
        self.index.register(external_id, name.clone())?;
        if let Err(e) = self
            .writable_staging("add file")
            .and_then(|staging| staging.write(&name, &bytes))
        {
            let _ = self.index.unregister(external_id);
            return Err(e);
        }

        debug!(
            "Added {:?} as '{}' ({}, {} bytes)",
            source,
            external_id,
            name,
            bytes.len()
        );
        Ok(())
    }

    /// Read the full contents of a resource
    ///
    /// Read-write sessions read the staged copy, so unsaved edits are
    /// visible. Read-only sessions read straight from the container.
    pub fn read_file(&self, external_id: &str) -> Result<Vec<u8>> {
        self.owner.ensure_readable("read file")?;
        let name = self.index.resolve(external_id)?;

        match &self.staging {
            Some(staging) => staging.read(name),
            None => ContainerReader::open(&self.path)?.read_resource(name),
        }
    }

    /// Replace the contents of a resource in the staging area
    pub fn write_file(&self, external_id: &str, bytes: &[u8]) -> Result<()> {
        self.owner.ensure_writable("write file")?;
        let name = self.index.resolve(external_id)?;
        self.writable_staging("write file")?.write(name, bytes)
    }

    /// Open a stream over a resource
    pub fn open_file(&self, external_id: &str, access: FileAccess) -> Result<ResourceHandle> {
        if access.reads() {
            self.owner.ensure_readable("open file")?;
        }
        if access.writes() {
            self.owner.ensure_writable("open file")?;
        }
        let name = self.index.resolve(external_id)?;

        match &self.staging {
            Some(staging) => Ok(ResourceHandle::Staged(
                access.open(&staging.path_for(name))?,
            )),
            None => {
                let bytes = ContainerReader::open(&self.path)?.read_resource(name)?;
                Ok(ResourceHandle::Archived(Cursor::new(bytes)))
            }
        }
    }

    /// Drop a resource from the index and the staging area
    pub fn remove_file(&mut self, external_id: &str) -> Result<()> {
        self.owner.ensure_writable("remove file")?;
        let name = self.index.unregister(external_id)?;
        self.writable_staging("remove file")?.remove(&name)?;
        debug!("Removed '{}' ({})", external_id, name);
        Ok(())
    }

    /// Copy a resource out to `dest`
    pub fn export_resource<P: AsRef<Path>>(&self, external_id: &str, dest: P) -> Result<()> {
        let bytes = self.read_file(external_id)?;
        fs::write(dest.as_ref(), bytes)?;
        Ok(())
    }

    /// Copy the resource an item points at out to `dest`
    pub fn export_item_resource<P: AsRef<Path>>(&self, item: &Item, dest: P) -> Result<()> {
        self.owner.ensure_owns(item.owner())?;
        self.export_resource(item.resource_id(), dest)
    }

    /// Decode the image an item points at
    #[cfg(feature = "image")]
    pub fn item_image(&self, item: &Item) -> Result<image::DynamicImage> {
        self.owner.ensure_owns(item.owner())?;
        let bytes = self.read_file(item.resource_id())?;
        crate::imaging::decode(&bytes)
    }

    /// Persist the session to its own path
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    /// Persist the session to `target`
    ///
    /// The previous file at `target` is moved aside first and restored if
    /// anything fails, so `target` ends up either fully rewritten or
    /// byte-identical to what it was. The session keeps its own path.
    pub fn save_as<P: AsRef<Path>>(&self, target: P) -> Result<()> {
        self.owner.ensure_writable("save")?;
        let staging = self.writable_staging("save")?;
        let target = target.as_ref();

        let data = self.document.export()?;
        let info = self.index.export()?;

        let transaction = ReplaceTransaction::begin(target)?;
        match self.write_container(target, staging, &data, &info) {
            Ok(()) => {
                transaction.commit()?;
                info!(
                    "Saved archive {:?} ({} resources)",
                    target,
                    self.index.len()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Saving {:?} failed, restoring previous file: {}", target, e);
                drop(transaction);
                Err(e)
            }
        }
    }

    fn write_container(
        &self,
        target: &Path,
        staging: &Staging,
        data: &[u8],
        info: &[u8],
    ) -> Result<()> {
        let mut writer = ContainerWriter::create(target, self.options.compression)?;
        writer.add_payload(DATA_ENTRY, data)?;
        writer.add_payload(INFO_ENTRY, info)?;
        for name in self.index.storage_names() {
            let bytes = staging.read(name)?;
            writer.add_resource(name, &bytes)?;
        }
        writer.finalize()
    }

    fn writable_staging(&self, operation: &'static str) -> Result<&Staging> {
        self.staging
            .as_ref()
            .ok_or_else(|| ArchiveError::PermissionDenied {
                operation,
                capability: Capability::Write,
                path: self.path.clone(),
            })
    }

    /// End the session, removing the staging directory
    ///
    /// Unsaved changes are discarded. Dropping the handle does the same but
    /// cannot report cleanup errors.
    pub fn close(mut self) -> Result<()> {
        if let Some(staging) = self.staging.take() {
            staging.close()?;
        }
        debug!("Closed archive {:?}", self.path);
        Ok(())
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("archive", &self.owner.archive())
            .field("resources", &self.index.len())
            .finish()
    }
}
