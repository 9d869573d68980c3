//! File lookup service shared by the REST and gRPC adapters

use crate::store::MetadataStore;
use crate::types::{Content, FileRecord};
use filesvc_common::{Error, FileId, Result};
use parking_lot::RwLock;
use tracing::{debug, error, warn};

/// Lookup and existence logic over a [`MetadataStore`].
///
/// Constructed once at startup and handed to both adapters behind an
/// `Arc`. The lock serializes administrative mutation; lookups only take
/// the read side.
#[derive(Debug, Default)]
pub struct FileService {
    store: RwLock<MetadataStore>,
}

impl FileService {
    /// Create a service over a seeded store
    #[must_use]
    pub fn new(store: MetadataStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Register a file, returning the record it replaced
    pub fn add(&self, record: FileRecord) -> Option<FileRecord> {
        debug!("Registering file {} ({:?})", record.id, record.locator);
        self.store.write().add(record)
    }

    /// Unregister a file
    pub fn remove(&self, id: &str) -> Option<FileRecord> {
        self.store.write().remove(id)
    }

    /// Number of registered files
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Whether no files are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Look up the record for a file.
    ///
    /// Returns `NotFound` when the id is unknown or when the record's
    /// content no longer resolves.
    pub async fn get_metadata(&self, id: &str) -> Result<FileRecord> {
        let id = FileId::new(id)?;
        // The lock is released before touching the filesystem
        let record = self.store.read().get(id.as_str()).cloned();
        let Some(record) = record else {
            error!("File with UUID {} not found.", id);
            return Err(Error::not_found(id.as_str()));
        };
        if !record.locator.resolves().await {
            warn!("File with UUID {} has no content at {:?}", id, record.locator);
            return Err(Error::not_found(id.as_str()));
        }
        Ok(record)
    }

    /// Open the content of a file.
    ///
    /// Unknown ids and unreachable content both yield `NotFound`. The
    /// returned [`Content`] owns the handle; dropping it closes the file.
    pub async fn open_content(&self, id: &str) -> Result<Content> {
        self.open(id).await.map(|(_, content)| content)
    }

    /// Look up a file and open its content in one step
    pub async fn open(&self, id: &str) -> Result<(FileRecord, Content)> {
        let record = self.get_metadata(id).await?;
        match record.locator.open().await {
            Ok(content) => Ok((record, content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("File with UUID {} not found on disk.", record.id);
                Err(Error::not_found(record.id.as_str()))
            }
            Err(e) => {
                error!("Failed to open content of {}: {}", record.id, e);
                Err(Error::storage(format!(
                    "failed to open content of {}: {e}",
                    record.id
                )))
            }
        }
    }
}
