//! HTTP adapter for filesvc.
//!
//! Exposes a [`FileService`] as an Axum router:
//!
//! - `GET /file/{id}/stat/` returns the metadata as JSON
//! - `GET /file/{id}/read/` streams the content as an attachment
//! - `GET /health` answers `OK`

pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use filesvc_meta_store::FileService;
use handlers::RestState;
use std::sync::Arc;

pub use error::RestError;

/// Build the file REST API router.
pub fn router(files: Arc<FileService>) -> Router {
    let state = Arc::new(RestState { files });

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/file/{id}/stat/", get(handlers::file_stat))
        .route("/file/{id}/read/", get(handlers::file_read))
        .with_state(state)
}
