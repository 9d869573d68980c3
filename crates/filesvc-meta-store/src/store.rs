//! In-memory table of file records.
//!
//! The store is not internally synchronized: mutation takes `&mut self`,
//! so callers sharing it across tasks wrap it in a lock (see
//! [`FileService`](crate::FileService)). Nothing is persisted.

use crate::types::FileRecord;
use filesvc_common::FileId;
use std::collections::HashMap;

/// Keyed table of file records, at most one per identifier
#[derive(Debug, Default)]
pub struct MetadataStore {
    records: HashMap<FileId, FileRecord>,
}

impl MetadataStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced
    pub fn add(&mut self, record: FileRecord) -> Option<FileRecord> {
        self.records.insert(record.id.clone(), record)
    }

    /// Remove a record by identifier
    pub fn remove(&mut self, id: &str) -> Option<FileRecord> {
        self.records.remove(id)
    }

    /// Look up a record by identifier
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.records.get(id)
    }

    /// Whether a record exists and its content currently resolves
    pub async fn exists(&self, id: &str) -> bool {
        match self.get(id) {
            Some(record) => record.locator.resolves().await,
            None => false,
        }
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers of all records, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = &FileId> {
        self.records.keys()
    }
}

impl FromIterator<FileRecord> for MetadataStore {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.add(record);
        }
        store
    }
}
