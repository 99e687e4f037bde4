//! Leaf records of the document tree

use crate::error::{ArchiveError, Result};
use crate::owner::OwnerLink;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Deref;

/// Free-form, caller-defined metadata attached to an item
///
/// Values are [`serde_json::Value`]s: strings, numbers, booleans, and nested
/// arrays or maps. Key order is preserved.
pub type Metadata = serde_json::Map<String, Value>;

/// A titled record pointing at one attached resource
///
/// The resource id is fixed at construction. Metadata is optional and
/// becomes absent again once its last key is removed.
///
/// # Examples
///
/// ```rust,no_run
/// use bdmp_rs::{Archive, Item, OpenMode};
///
/// # fn main() -> bdmp_rs::Result<()> {
/// let mut archive = Archive::open("notes.bdm", OpenMode::ReadWrite)?;
/// let mut item = Item::new(archive.owner(), "Cover", "Front page", "cover", 0);
/// item.add_metadata("width", 1200)?;
///
/// archive.document_mut().add_section("intro", "chapter", "Introduction")?;
/// if let Some(mut section) = archive.document_mut().section_mut("intro")? {
///     section.insert_item("cover", item)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    owner: OwnerLink,
    title: String,
    content: String,
    resource_id: String,
    level: i64,
    metadata: Option<Metadata>,
}

/// Serialized form of an item
///
/// `image` is the older spelling of `image_id`; when both are present
/// `image_id` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ItemRecord {
    title: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_id: Option<String>,
    #[serde(default, skip_serializing)]
    image: Option<String>,
    level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Metadata>,
}

impl Item {
    /// Build an item under the archive session `owner` belongs to
    pub fn new(
        owner: &OwnerLink,
        title: impl Into<String>,
        content: impl Into<String>,
        resource_id: impl Into<String>,
        level: i64,
    ) -> Self {
        Item {
            owner: owner.clone(),
            title: title.into(),
            content: content.into(),
            resource_id: resource_id.into(),
            level,
            metadata: None,
        }
    }

    /// Attach initial metadata; an empty map counts as no metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }

    pub fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// External id of the attached resource
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_value(&self, name: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(name))
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.owner.ensure_writable("set item title")?;
        self.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.owner.ensure_writable("set item content")?;
        self.content = content.into();
        Ok(())
    }

    pub fn set_level(&mut self, level: i64) -> Result<()> {
        self.owner.ensure_writable("set item level")?;
        self.level = level;
        Ok(())
    }

    /// Set a metadata key, returning the value it replaced
    pub fn add_metadata(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.owner.ensure_writable("add item metadata")?;
        Ok(self
            .metadata
            .get_or_insert_with(Metadata::new)
            .insert(name.into(), value.into()))
    }

    /// Remove a metadata key, returning its value
    pub fn remove_metadata(&mut self, name: &str) -> Result<Value> {
        self.owner.ensure_writable("remove item metadata")?;

        let metadata = self
            .metadata
            .as_mut()
            .ok_or_else(|| ArchiveError::NotFound(format!("metadata '{}' (item has none)", name)))?;
        let value = metadata
            .shift_remove(name)
            .ok_or_else(|| ArchiveError::NotFound(format!("metadata '{}'", name)))?;

        if metadata.is_empty() {
            self.metadata = None;
        }
        Ok(value)
    }

    pub(crate) fn to_record(&self) -> ItemRecord {
        ItemRecord {
            title: self.title.clone(),
            content: self.content.clone(),
            image_id: Some(self.resource_id.clone()),
            image: None,
            level: self.level,
            data: self.metadata.clone(),
        }
    }

    pub(crate) fn from_record(owner: &OwnerLink, key: &str, record: ItemRecord) -> Result<Self> {
        let resource_id = record.image_id.or(record.image).ok_or_else(|| {
            ArchiveError::invalid_file(
                owner.path(),
                format!("Item '{}' has no resource id", key),
            )
        })?;

        Ok(Item::new(owner, record.title, record.content, resource_id, record.level)
            .with_metadata(record.data.unwrap_or_default()))
    }
}

/// Mutable access to an item that lives inside a section
///
/// Reads go through `Deref`. Only field setters are exposed, so the item
/// itself can never be swapped for one owned by another session.
#[derive(Debug)]
pub struct ItemMut<'a> {
    item: &'a mut Item,
}

impl<'a> ItemMut<'a> {
    pub(crate) fn new(item: &'a mut Item) -> Self {
        ItemMut { item }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.item.set_title(title)
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.item.set_content(content)
    }

    pub fn set_level(&mut self, level: i64) -> Result<()> {
        self.item.set_level(level)
    }

    pub fn add_metadata(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.item.add_metadata(name, value)
    }

    pub fn remove_metadata(&mut self, name: &str) -> Result<Value> {
        self.item.remove_metadata(name)
    }
}

impl Deref for ItemMut<'_> {
    type Target = Item;

    fn deref(&self) -> &Item {
        &*self.item
    }
}
