//! filesvc server
//!
//! Serves one in-process [`FileService`] over both REST (axum) and gRPC
//! (tonic). The binary wires these together; integration tests use the
//! same entry points on ephemeral ports.

pub mod config;
pub mod grpc;

use axum::Router;
use config::{SeedFile, ServerConfig};
use filesvc_meta_store::{FileService, MetadataStore};
use filesvc_proto::FileServer;
use grpc::FileGrpcService;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the file service from configured seed entries.
///
/// Entries with an invalid id are skipped with a warning. Entries whose
/// content is missing are registered anyway and report not-found until
/// the file appears.
pub fn build_file_service(seeds: Vec<SeedFile>, data_dir: &Path) -> FileService {
    let mut store = MetadataStore::new();
    for seed in seeds {
        let id = seed.id.clone();
        match seed.into_record(data_dir) {
            Ok(record) => {
                store.add(record);
            }
            Err(e) => warn!("Skipping file entry {:?}: {}", id, e),
        }
    }
    info!("Registered {} files", store.len());
    FileService::new(store)
}

/// REST application with request tracing
pub fn rest_app(files: Arc<FileService>) -> Router {
    filesvc_rest::router(files).layer(TraceLayer::new_for_http())
}

/// Serve REST on `listener` until `shutdown` resolves
pub async fn serve_rest<F>(
    listener: TcpListener,
    files: Arc<FileService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, rest_app(files))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Limit on gRPC requests in flight across all connections.
///
/// Every connection's service stack shares the one semaphore.
pub fn request_limit(max_concurrent_requests: usize) -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(max_concurrent_requests.max(1))
}

/// Serve gRPC on `listener` until `shutdown` resolves
pub async fn serve_grpc<F>(
    listener: TcpListener,
    files: Arc<FileService>,
    config: &ServerConfig,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    let service = FileGrpcService::new(files, config.chunk_size);

    tonic::transport::Server::builder()
        .layer(request_limit(config.max_concurrent_requests))
        .add_service(FileServer::new(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
