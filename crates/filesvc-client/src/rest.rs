//! REST transport

use crate::backend::FileBackend;
use async_trait::async_trait;
use filesvc_common::{
    BackendKind, Error, FileContent, FileMetadata, Result, TransportStatus,
    filename_from_disposition,
};
use reqwest::{StatusCode, Url, header};
use std::time::Duration;
use tracing::debug;

/// Client for the file REST API
pub struct RestBackend {
    base_url: Url,
    http: reqwest::Client,
}

impl RestBackend {
    /// Create a REST backend for the given base URL.
    ///
    /// `timeout` bounds every request, including reading the body.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid base URL {base_url:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base URL {base_url:?} cannot carry a path"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/file/{id}/{action}/`, with the id percent-encoded
    fn file_url(&self, id: &str, action: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::configuration("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["file", id, action, ""]);
        Ok(url)
    }

    /// Issue a GET and sort the status into the error taxonomy
    async fn get(&self, id: &str, action: &str) -> Result<reqwest::Response> {
        let url = self.file_url(id, action)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::not_found(id)),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::invalid_argument(error_description(&body)))
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(Error::transport(
                    TransportStatus::Http(status.as_u16()),
                    message,
                ))
            }
        }
    }
}

/// Message of a `{"error", "description"}` body, or the raw body
fn error_description(body: &str) -> String {
    let description = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("description")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    match description.strip_prefix("invalid argument: ") {
        Some(message) => message.to_string(),
        None => description,
    }
}

#[async_trait]
impl FileBackend for RestBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rest
    }

    async fn stat(&self, id: &str) -> Result<FileMetadata> {
        let response = self.get(id, "stat").await?;
        response
            .json::<FileMetadata>()
            .await
            .map_err(|e| Error::Deserialization(format!("invalid stat reply for {id}: {e}")))
    }

    async fn read(&self, id: &str) -> Result<FileContent> {
        let response = self.get(id, "read").await?;
        let name = filename_from_disposition(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
        );
        let data = response
            .bytes()
            .await
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;

        debug!("Read {} bytes of {} as {:?}", data.len(), id, name);
        Ok(FileContent { name, data })
    }
}
