//! Sections: ordered collections of items

use super::item::{Item, ItemMut, ItemRecord};
use crate::error::{ArchiveError, Result};
use crate::owner::OwnerLink;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Insertion-ordered mapping from item key to [`Item`]
///
/// Lookups, counts and iteration need read access; inserting, removing or
/// borrowing an item mutably needs write access. Every item in a section
/// belongs to the same archive session as the section itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    owner: OwnerLink,
    kind: String,
    description: String,
    items: IndexMap<String, Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SectionRecord {
    #[serde(rename = "type")]
    kind: String,
    description: String,
    #[serde(default)]
    content: IndexMap<String, ItemRecord>,
}

impl Section {
    /// Build an empty section under the archive session `owner` belongs to
    pub fn new(owner: &OwnerLink, kind: impl Into<String>, description: impl Into<String>) -> Self {
        Section {
            owner: owner.clone(),
            kind: kind.into(),
            description: description.into(),
            items: IndexMap::new(),
        }
    }

    pub fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    /// Section type tag (`type` on the wire)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.owner.ensure_writable("set section description")?;
        self.description = description.into();
        Ok(())
    }

    /// Create an item in this section and return its key
    ///
    /// A random key is generated when `key` is `None`. An existing item under
    /// the same key is replaced in place.
    pub fn add_item(
        &mut self,
        key: Option<&str>,
        title: impl Into<String>,
        content: impl Into<String>,
        resource_id: impl Into<String>,
        level: i64,
    ) -> Result<String> {
        self.owner.ensure_writable("add item")?;

        let key = match key {
            Some(key) => key.to_string(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let item = Item::new(&self.owner, title, content, resource_id, level);
        self.items.insert(key.clone(), item);
        Ok(key)
    }

    /// Insert an item built elsewhere, returning the item it replaced
    ///
    /// Fails with `OwnershipMismatch` if the item was built under another
    /// archive session; the section is left unchanged.
    pub fn insert_item(&mut self, key: impl Into<String>, item: Item) -> Result<Option<Item>> {
        self.owner.ensure_writable("insert item")?;
        self.owner.ensure_owns(item.owner())?;
        Ok(self.items.insert(key.into(), item))
    }

    pub fn remove_item(&mut self, key: &str) -> Result<Item> {
        self.owner.ensure_writable("remove item")?;
        self.items
            .shift_remove(key)
            .ok_or_else(|| ArchiveError::NotFound(format!("item '{}'", key)))
    }

    pub fn item(&self, key: &str) -> Result<Option<&Item>> {
        self.owner.ensure_readable("get item")?;
        Ok(self.items.get(key))
    }

    pub fn item_mut(&mut self, key: &str) -> Result<Option<ItemMut<'_>>> {
        self.owner.ensure_writable("modify item")?;
        Ok(self.items.get_mut(key).map(ItemMut::new))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.owner.ensure_readable("check item")?;
        Ok(self.items.contains_key(key))
    }

    /// Items in insertion order
    pub fn items(&self) -> Result<indexmap::map::Iter<'_, String, Item>> {
        self.owner.ensure_readable("iterate items")?;
        Ok(self.items.iter())
    }

    pub fn keys(&self) -> Result<impl Iterator<Item = &str>> {
        self.owner.ensure_readable("iterate items")?;
        Ok(self.items.keys().map(String::as_str))
    }

    pub fn len(&self) -> Result<usize> {
        self.owner.ensure_readable("count items")?;
        Ok(self.items.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub(crate) fn item_count(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn to_record(&self) -> SectionRecord {
        SectionRecord {
            kind: self.kind.clone(),
            description: self.description.clone(),
            content: self
                .items
                .iter()
                .map(|(key, item)| (key.clone(), item.to_record()))
                .collect(),
        }
    }

    pub(crate) fn from_record(owner: &OwnerLink, record: SectionRecord) -> Result<Self> {
        let mut section = Section::new(owner, record.kind, record.description);
        for (key, item) in record.content {
            let item = Item::from_record(owner, &key, item)?;
            section.items.insert(key, item);
        }
        Ok(section)
    }
}

/// Mutable access to a section that lives inside a document
///
/// Same contract as [`ItemMut`]: reads through `Deref`, writes only through
/// the checked section operations.
#[derive(Debug)]
pub struct SectionMut<'a> {
    section: &'a mut Section,
}

impl<'a> SectionMut<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        SectionMut { section }
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.section.set_description(description)
    }

    pub fn add_item(
        &mut self,
        key: Option<&str>,
        title: impl Into<String>,
        content: impl Into<String>,
        resource_id: impl Into<String>,
        level: i64,
    ) -> Result<String> {
        self.section.add_item(key, title, content, resource_id, level)
    }

    pub fn insert_item(&mut self, key: impl Into<String>, item: Item) -> Result<Option<Item>> {
        self.section.insert_item(key, item)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<Item> {
        self.section.remove_item(key)
    }

    pub fn item_mut(&mut self, key: &str) -> Result<Option<ItemMut<'_>>> {
        self.section.item_mut(key)
    }
}

impl Deref for SectionMut<'_> {
    type Target = Section;

    fn deref(&self) -> &Section {
        &*self.section
    }
}
