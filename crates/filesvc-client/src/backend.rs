//! Transport-independent file operations

use crate::grpc::GrpcBackend;
use crate::rest::RestBackend;
use async_trait::async_trait;
use filesvc_common::{BackendKind, ClientConfig, FileContent, FileMetadata, Result};

/// The `{stat, read}` capability every transport provides.
#[async_trait]
pub trait FileBackend: Send + Sync {
    /// Which transport this is
    fn kind(&self) -> BackendKind;

    /// Fetch the metadata of a file
    async fn stat(&self, id: &str) -> Result<FileMetadata>;

    /// Fetch the full content of a file and its display name
    async fn read(&self, id: &str) -> Result<FileContent>;
}

/// A concrete transport together with its connection settings
pub enum Backend {
    Rest(RestBackend),
    Grpc(GrpcBackend),
}

impl Backend {
    /// Resolve the backend tag and build the matching transport.
    ///
    /// An unknown tag or unusable connection parameters fail here with
    /// `Error::Configuration`; no network I/O happens.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        match config.backend_kind()? {
            BackendKind::Rest => Ok(Self::Rest(RestBackend::new(
                &config.base_url,
                config.timeout,
            )?)),
            BackendKind::Grpc => Ok(Self::Grpc(GrpcBackend::new(
                &config.grpc_server,
                config.timeout,
            )?)),
        }
    }
}

#[async_trait]
impl FileBackend for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Self::Rest(rest) => rest.kind(),
            Self::Grpc(grpc) => grpc.kind(),
        }
    }

    async fn stat(&self, id: &str) -> Result<FileMetadata> {
        match self {
            Self::Rest(rest) => rest.stat(id).await,
            Self::Grpc(grpc) => grpc.stat(id).await,
        }
    }

    async fn read(&self, id: &str) -> Result<FileContent> {
        match self {
            Self::Rest(rest) => rest.read(id).await,
            Self::Grpc(grpc) => grpc.read(id).await,
        }
    }
}
