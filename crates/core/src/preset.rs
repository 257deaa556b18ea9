//! Preset catalog records and caller-side preset metadata.
//!
//! [`Category`] and [`Preset`] are read-only snapshots of server state,
//! produced by deserializing Codex API responses. [`PresetMetadata`] is
//! owned by the integrating plugin and records which preset version it
//! has installed; [`PresetRecord`] lets the client ask for updates of any
//! caller-defined type carrying that metadata.

use serde::{Deserialize, Serialize};

use crate::types::{deserialize_timestamp, PresetId, Timestamp};

/// Server-enforced limit on category nesting.
pub const MAX_CATEGORY_DEPTH: usize = 4;

/* --------------------------------------------------------------------------
   Server records
   -------------------------------------------------------------------------- */

/// A named node in the preset tree.
///
/// Both lists are optional; a category with neither is legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub subcategories: Option<Vec<Category>>,
    #[serde(default)]
    pub presets: Option<Vec<Preset>>,
}

/// A remote-authored, versioned configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Server-assigned, stable identity.
    pub id: PresetId,
    pub name: String,
    pub description: Option<String>,
    /// Increases monotonically per `id` on the server.
    pub version: i32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: Timestamp,
    /// Opaque payload, interpreted only by the plugin.
    pub data: String,
}

impl Category {
    /// Nesting depth of this subtree: 1 for a category without
    /// subcategories.
    pub fn depth(&self) -> usize {
        1 + self
            .subcategories()
            .iter()
            .map(Category::depth)
            .max()
            .unwrap_or(0)
    }

    /// Child categories, empty when absent.
    pub fn subcategories(&self) -> &[Category] {
        self.subcategories.as_deref().unwrap_or_default()
    }

    /// Presets directly in this category, empty when absent.
    pub fn presets(&self) -> &[Preset] {
        self.presets.as_deref().unwrap_or_default()
    }

    /// Every preset in the subtree, depth-first: a category's own presets
    /// come before those of its subcategories.
    pub fn iter_presets(&self) -> PresetIter<'_> {
        PresetIter {
            stack: self.subcategories().iter().rev().collect(),
            current: self.presets().iter(),
        }
    }

    /// First preset with the given id anywhere in the subtree.
    pub fn find_preset(&self, id: PresetId) -> Option<&Preset> {
        self.iter_presets().find(|p| p.id == id)
    }
}

/// Depth-first iterator returned by [`Category::iter_presets`].
pub struct PresetIter<'a> {
    stack: Vec<&'a Category>,
    current: std::slice::Iter<'a, Preset>,
}

impl<'a> Iterator for PresetIter<'a> {
    type Item = &'a Preset;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(preset) = self.current.next() {
                return Some(preset);
            }
            let category = self.stack.pop()?;
            // Reversed so the first subcategory is visited first.
            self.stack.extend(category.subcategories().iter().rev());
            self.current = category.presets().iter();
        }
    }
}

/* --------------------------------------------------------------------------
   Caller-side metadata
   -------------------------------------------------------------------------- */

/// "Which preset, at which known version", owned by the plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMetadata {
    pub id: PresetId,
    pub version: i32,
}

impl PresetMetadata {
    pub fn new(id: PresetId, version: i32) -> Self {
        Self { id, version }
    }

    /// True when `remote` is the same preset at a strictly newer version.
    pub fn is_outdated_by(&self, remote: &Preset) -> bool {
        self.id == remote.id && remote.version > self.version
    }
}

impl From<&Preset> for PresetMetadata {
    fn from(preset: &Preset) -> Self {
        Self {
            id: preset.id,
            version: preset.version,
        }
    }
}

/// A plugin-defined record that may have been installed from a preset.
pub trait PresetRecord {
    /// Metadata of the preset this record came from, if any.
    fn metadata(&self) -> Option<&PresetMetadata>;

    fn name(&self) -> &str;
}

impl<T: PresetRecord + ?Sized> PresetRecord for &T {
    fn metadata(&self) -> Option<&PresetMetadata> {
        (**self).metadata()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Ids of the records that carry metadata, in input order.
pub fn metadata_ids<T: PresetRecord>(records: &[T]) -> Vec<PresetId> {
    records
        .iter()
        .filter_map(|r| r.metadata().map(|m| m.id))
        .collect()
}

/// Comma-joined decimal ids, in input order (`[3, 1, 2]` -> `"3,1,2"`).
pub fn format_id_query(ids: &[PresetId]) -> String {
    ids.iter()
        .map(PresetId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
