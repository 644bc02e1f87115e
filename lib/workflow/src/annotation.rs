//! Per-node annotation records.
//!
//! A note node can carry free-text notes, the names of files dropped onto
//! it, and link URLs. The record lives in the key-value store under
//! `node-<id>`, independent of the in-memory node, and is created lazily on
//! the first edit.

use serde::{Deserialize, Serialize};
use tracing::debug;
use waypost_core::NodeId;
use waypost_store::{KeyValueStore, StorageKey, StoreError, load_json, save_json};

/// A file attached to a node. Only the name is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
}

impl FileRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Notes, files and links attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRecord {
    /// Free-text notes.
    pub notes: String,
    /// Attached files, in the order they were added.
    pub files: Vec<FileRef>,
    /// Link URLs, in the order they were added.
    pub links: Vec<String>,
}

impl AnnotationRecord {
    /// Returns whether the record carries nothing worth showing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.trim().is_empty() && self.files.is_empty() && self.links.is_empty()
    }

    /// Replaces the notes text.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Appends files by name.
    pub fn add_files<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(names.into_iter().map(FileRef::new));
    }

    /// Appends a link.
    pub fn add_link(&mut self, url: impl Into<String>) {
        self.links.push(url.into());
    }

    /// Copies links found in the notes into `links`, skipping ones already
    /// present. Returns how many were added.
    pub fn absorb_links_from_notes(&mut self) -> usize {
        let mut added = 0;
        for link in extract_links(&self.notes) {
            if !self.links.contains(&link) {
                self.links.push(link);
                added += 1;
            }
        }
        added
    }
}

const LINK_PREFIXES: [&str; 3] = ["http://", "https://", "www."];

/// Finds URL-looking tokens in free text, in order of appearance.
///
/// A token counts when it starts with `http://`, `https://` or `www.`
/// (case-insensitive) and has something after the prefix. Wrapping
/// punctuation is stripped.
#[must_use]
pub fn extract_links(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| {
            let token = token.trim_start_matches(['(', '<', '[', '"', '\'']);
            let token = token.trim_end_matches([
                '.', ',', ';', ':', '!', '?', ')', '>', ']', '"', '\'',
            ]);
            let lower = token.to_ascii_lowercase();
            LINK_PREFIXES
                .iter()
                .any(|prefix| lower.starts_with(prefix) && lower.len() > prefix.len())
                .then(|| token.to_string())
        })
        .collect()
}

/// Annotation access on top of any [`KeyValueStore`].
pub trait AnnotationStore {
    /// Returns the record of `node_id`. Absent and malformed records are
    /// both `None`.
    fn annotation(&self, node_id: &NodeId) -> Option<AnnotationRecord>;

    /// Stores the record of `node_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the record.
    fn save_annotation(
        &mut self,
        node_id: &NodeId,
        record: &AnnotationRecord,
    ) -> Result<(), StoreError>;

    /// Applies `edit` to the record of `node_id`, creating an empty record
    /// first when none exists, and stores the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the record.
    fn edit_annotation<F>(&mut self, node_id: &NodeId, edit: F) -> Result<AnnotationRecord, StoreError>
    where
        F: FnOnce(&mut AnnotationRecord);
}

impl<S: KeyValueStore + ?Sized> AnnotationStore for S {
    fn annotation(&self, node_id: &NodeId) -> Option<AnnotationRecord> {
        load_json(self, &StorageKey::annotation(node_id))
    }

    fn save_annotation(
        &mut self,
        node_id: &NodeId,
        record: &AnnotationRecord,
    ) -> Result<(), StoreError> {
        save_json(self, &StorageKey::annotation(node_id), record)
    }

    fn edit_annotation<F>(&mut self, node_id: &NodeId, edit: F) -> Result<AnnotationRecord, StoreError>
    where
        F: FnOnce(&mut AnnotationRecord),
    {
        let mut record = self.annotation(node_id).unwrap_or_default();
        edit(&mut record);
        self.save_annotation(node_id, &record)?;
        debug!(node_id = %node_id, "saved annotation");
        Ok(record)
    }
}
