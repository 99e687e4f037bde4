//! Resource index: external file ids to internal storage names
//!
//! Callers name resources by a stable external id of their choosing. The
//! bytes are stored under a separate, usually generated, storage name so the
//! on-disk layout never depends on caller input. The index is stored in the
//! archive's `info` entry together with the archive's display name.

use crate::error::{ArchiveError, Result};
use crate::owner::OwnerLink;
use crate::payload;
use crate::validation::StorageName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Display name given to archives created without one
pub const DEFAULT_DISPLAY_NAME: &str = "NoName";

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceIndex {
    owner: OwnerLink,
    display_name: String,
    files: IndexMap<String, StorageName>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResourceIndexRecord {
    name: String,
    #[serde(default)]
    files: IndexMap<String, StorageName>,
}

impl ResourceIndex {
    pub(crate) fn empty(owner: &OwnerLink, display_name: impl Into<String>) -> Self {
        ResourceIndex {
            owner: owner.clone(),
            display_name: display_name.into(),
            files: IndexMap::new(),
        }
    }

    pub fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.owner.ensure_writable("set display name")?;
        self.display_name = name.into();
        Ok(())
    }

    /// Register a new external id; duplicate ids are rejected
    pub(crate) fn register(&mut self, external_id: &str, name: StorageName) -> Result<()> {
        self.owner.ensure_writable("register file")?;
        if self.files.contains_key(external_id) {
            return Err(ArchiveError::AlreadyExists(format!("file id '{}'", external_id)));
        }
        self.files.insert(external_id.to_string(), name);
        Ok(())
    }

    pub(crate) fn unregister(&mut self, external_id: &str) -> Result<StorageName> {
        self.owner.ensure_writable("unregister file")?;
        self.files
            .shift_remove(external_id)
            .ok_or_else(|| ArchiveError::NotFound(format!("file id '{}'", external_id)))
    }

    pub fn storage_name(&self, external_id: &str) -> Option<&StorageName> {
        self.files.get(external_id)
    }

    /// Storage name of a registered id, or `NotFound`
    pub fn resolve(&self, external_id: &str) -> Result<&StorageName> {
        self.storage_name(external_id)
            .ok_or_else(|| ArchiveError::NotFound(format!("file id '{}'", external_id)))
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.files.contains_key(external_id)
    }

    /// `(external id, storage name)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StorageName)> {
        self.files.iter().map(|(id, name)| (id.as_str(), name))
    }

    pub fn storage_names(&self) -> impl Iterator<Item = &StorageName> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        payload::encode(&ResourceIndexRecord {
            name: self.display_name.clone(),
            files: self.files.clone(),
        })
    }

    pub fn import(bytes: &[u8], owner: &OwnerLink) -> Result<Self> {
        let record: ResourceIndexRecord = payload::decode(bytes, "info", owner.path())?;
        Ok(ResourceIndex {
            owner: owner.clone(),
            display_name: record.name,
            files: record.files,
        })
    }
}
