//! Document tree: sections of items
//!
//! ```text
//! Document
//!  └─ "intro"  Section { type, description }
//!      ├─ "cover"  Item { title, content, image_id, level, data? }
//!      └─ "p1"     Item { ... }
//! ```
//!
//! The whole tree is stored in the archive's `data` entry as one versioned
//! JSON payload. Every node carries the [`OwnerLink`] of the archive session
//! it was built under. Nodes inside a tree are only handed out mutably as
//! [`DocumentMut`], [`SectionMut`] and [`ItemMut`] guards, so a node from
//! another session can only enter through the ownership-checked inserts.

pub mod item;
pub mod section;

pub use item::{Item, ItemMut, Metadata};
pub use section::{Section, SectionMut};

use crate::error::{ArchiveError, Result};
use crate::owner::OwnerLink;
use crate::payload;
use indexmap::IndexMap;
use section::SectionRecord;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Root of the document tree: section key to [`Section`], in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    owner: OwnerLink,
    sections: IndexMap<String, Section>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    sections: IndexMap<String, SectionRecord>,
}

impl Document {
    pub(crate) fn empty(owner: &OwnerLink) -> Self {
        Document {
            owner: owner.clone(),
            sections: IndexMap::new(),
        }
    }

    pub fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    /// Create an empty section, replacing any section under the same key
    pub fn add_section(
        &mut self,
        key: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<SectionMut<'_>> {
        self.owner.ensure_writable("add section")?;
        let section = Section::new(&self.owner, kind, description);
        let entry = self.sections.entry(key.into());
        Ok(SectionMut::new(match entry {
            indexmap::map::Entry::Occupied(mut occupied) => {
                occupied.insert(section);
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(section),
        }))
    }

    /// Insert a section built elsewhere, returning the section it replaced
    pub fn insert_section(
        &mut self,
        key: impl Into<String>,
        section: Section,
    ) -> Result<Option<Section>> {
        self.owner.ensure_writable("insert section")?;
        self.owner.ensure_owns(section.owner())?;
        Ok(self.sections.insert(key.into(), section))
    }

    pub fn remove_section(&mut self, key: &str) -> Result<Section> {
        self.owner.ensure_writable("remove section")?;
        self.sections
            .shift_remove(key)
            .ok_or_else(|| ArchiveError::NotFound(format!("section '{}'", key)))
    }

    pub fn section(&self, key: &str) -> Result<Option<&Section>> {
        self.owner.ensure_readable("get section")?;
        Ok(self.sections.get(key))
    }

    pub fn section_mut(&mut self, key: &str) -> Result<Option<SectionMut<'_>>> {
        self.owner.ensure_writable("modify section")?;
        Ok(self.sections.get_mut(key).map(SectionMut::new))
    }

    /// Membership test; allowed in every mode
    pub fn contains_section(&self, key: &str) -> bool {
        self.sections.contains_key(key)
    }

    pub fn sections(&self) -> Result<indexmap::map::Iter<'_, String, Section>> {
        self.owner.ensure_readable("iterate sections")?;
        Ok(self.sections.iter())
    }

    pub fn section_keys(&self) -> Result<impl Iterator<Item = &str>> {
        self.owner.ensure_readable("iterate sections")?;
        Ok(self.sections.keys().map(String::as_str))
    }

    pub fn section_count(&self) -> Result<usize> {
        self.owner.ensure_readable("count sections")?;
        Ok(self.sections.len())
    }

    /// Total number of items across all sections
    pub fn len(&self) -> Result<usize> {
        self.owner.ensure_readable("count items")?;
        Ok(self.sections.values().map(Section::item_count).sum())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Serialize the tree into a versioned payload
    pub fn export(&self) -> Result<Vec<u8>> {
        let record = DocumentRecord {
            sections: self
                .sections
                .iter()
                .map(|(key, section)| (key.clone(), section.to_record()))
                .collect(),
        };
        payload::encode(&record)
    }

    /// Rebuild a tree from a payload produced by [`Document::export`]
    ///
    /// Fails with `VersionMismatch` if the payload was written by a newer
    /// format version and with `InvalidFile` if it does not decode.
    pub fn import(bytes: &[u8], owner: &OwnerLink) -> Result<Self> {
        let record: DocumentRecord = payload::decode(bytes, "data", owner.path())?;

        let mut document = Document::empty(owner);
        for (key, section) in record.sections {
            let section = Section::from_record(owner, section)?;
            document.sections.insert(key, section);
        }
        Ok(document)
    }
}

/// Mutable access to an archive's document
#[derive(Debug)]
pub struct DocumentMut<'a> {
    document: &'a mut Document,
}

impl<'a> DocumentMut<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        DocumentMut { document }
    }

    pub fn add_section(
        &mut self,
        key: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<SectionMut<'_>> {
        self.document.add_section(key, kind, description)
    }

    pub fn insert_section(
        &mut self,
        key: impl Into<String>,
        section: Section,
    ) -> Result<Option<Section>> {
        self.document.insert_section(key, section)
    }

    pub fn remove_section(&mut self, key: &str) -> Result<Section> {
        self.document.remove_section(key)
    }

    pub fn section_mut(&mut self, key: &str) -> Result<Option<SectionMut<'_>>> {
        self.document.section_mut(key)
    }
}

impl Deref for DocumentMut<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        &*self.document
    }
}
