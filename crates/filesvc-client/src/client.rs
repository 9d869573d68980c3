//! Backend-agnostic file client

use crate::backend::{Backend, FileBackend};
use filesvc_common::{BackendKind, ClientConfig, FileContent, FileMetadata, Result};
use tracing::debug;

/// Stat and read files through whichever transport was configured.
///
/// The backend is fixed at construction. Failures from the backend are
/// returned unchanged; nothing is retried and there is no fallback to the
/// other transport.
pub struct FileClient {
    backend: Backend,
}

impl FileClient {
    /// Build a client from connection parameters.
    ///
    /// Fails with `Error::Configuration` for an unknown backend tag,
    /// before any network activity.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let backend = Backend::from_config(config)?;
        debug!("File client using {} backend", backend.kind());
        Ok(Self { backend })
    }

    /// Build a client around an already constructed backend
    #[must_use]
    pub const fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }

    /// Transport in use
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Fetch the metadata of a file
    pub async fn stat(&self, id: &str) -> Result<FileMetadata> {
        self.backend.stat(id).await
    }

    /// Fetch the full content of a file and its display name
    pub async fn read(&self, id: &str) -> Result<FileContent> {
        self.backend.read(id).await
    }
}
