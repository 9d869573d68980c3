//! Axum handlers for the file REST API.

use crate::error::RestError;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use filesvc_common::{Error, FileMetadata, content_disposition};
use filesvc_meta_store::{Content, FileRecord, FileService};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

type Result<T> = std::result::Result<T, RestError>;

/// Shared state for the REST handlers.
pub struct RestState {
    pub files: Arc<FileService>,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// An empty `{id}` segment names no file
fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        debug!("Empty file id in path");
        return Err(Error::not_found(id).into());
    }
    Ok(())
}

/// GET /file/{id}/stat/
///
/// # Errors
/// `NotFound` (404) for unknown ids or unreachable content, and
/// `InvalidArgument` (400) when the stored timestamp does not parse.
pub async fn file_stat(
    State(state): State<Arc<RestState>>,
    Path(id): Path<String>,
) -> Result<Json<FileMetadata>> {
    debug!("GET stat: {}", id);
    require_id(&id)?;
    let record = state.files.get_metadata(&id).await?;
    Ok(Json(record.to_metadata()?))
}

/// GET /file/{id}/read/
///
/// The response body owns the open content. Whether the transfer
/// completes, fails mid-write, or the client disconnects, dropping the
/// body closes the handle.
///
/// # Errors
/// `NotFound` (404) for unknown ids or unreachable content.
pub async fn file_read(
    State(state): State<Arc<RestState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    debug!("GET read: {}", id);
    require_id(&id)?;
    let (record, content) = state.files.open(&id).await?;
    attachment(&record, content)
}

/// Build the download response; the body takes ownership of `content`.
fn attachment(record: &FileRecord, content: Content) -> Result<Response> {
    let id = &record.id;
    let content_type = HeaderValue::from_str(&record.mimetype).map_err(|e| {
        error!("Invalid MIME type {:?} for {}: {}", record.mimetype, id, e);
        Error::storage(format!("invalid MIME type for {id}"))
    })?;
    let disposition =
        HeaderValue::from_bytes(content_disposition(&record.name).as_bytes()).map_err(|e| {
            error!("Invalid file name {:?} for {}: {}", record.name, id, e);
            Error::storage(format!("invalid file name for {id}"))
        })?;
    let content_length = content.len();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from_stream(ReaderStream::new(content)))
        .map_err(|e| Error::storage(format!("failed to build response: {e}")))?;

    Ok(response)
}
