//! Core type definitions for filesvc
//!
//! This module defines the file identifier, the client-visible metadata
//! view, and the wire helpers both transports share (timestamps and the
//! `Content-Disposition` convention).

use crate::error::Error;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name reported for read content when the transport did not carry one
pub const DEFAULT_FILE_NAME: &str = "file";

/// Maximum identifier length in bytes
pub const MAX_FILE_ID_LEN: usize = 255;

/// Opaque file identifier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct FileId(String);

impl FileId {
    /// Create a new file identifier
    pub fn new(id: impl Into<String>) -> Result<Self, FileIdError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate a file identifier.
    ///
    /// Identifiers are opaque: anything that can travel as a single URL
    /// path segment and as a protobuf string is accepted.
    fn validate(id: &str) -> Result<(), FileIdError> {
        if id.is_empty() {
            return Err(FileIdError::Empty);
        }
        if id.len() > MAX_FILE_ID_LEN {
            return Err(FileIdError::TooLong);
        }
        for c in id.chars() {
            if c == '/' || c.is_control() {
                return Err(FileIdError::InvalidChar(c));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({:?})", self.0)
    }
}

// Lets keyed tables be queried with a plain `&str`.
impl Borrow<str> for FileId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for FileId {
    type Err = FileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Errors that can occur when creating a file identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileIdError {
    #[error("file identifier must not be empty")]
    Empty,
    #[error("file identifier must be at most {MAX_FILE_ID_LEN} bytes")]
    TooLong,
    #[error("file identifier contains invalid character: {0:?}")]
    InvalidChar(char),
}

impl From<FileIdError> for Error {
    fn from(err: FileIdError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// File metadata as seen by clients.
///
/// Field order matches the REST wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Creation time, RFC 3339 in UTC
    pub create_datetime: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type of the content
    pub mimetype: String,
    /// Display name
    pub name: String,
}

impl FileMetadata {
    /// Parse the creation timestamp
    pub fn created_at(&self) -> Result<DateTime<Utc>, Error> {
        parse_timestamp(&self.create_datetime)
    }
}

/// Full content of a file together with its display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileContent {
    pub name: String,
    pub data: Bytes,
}

/// Parse a stored or received timestamp.
///
/// Accepts RFC 3339 with any offset, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// which is taken to be UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::invalid_argument(format!("invalid datetime {value:?}: {e}")))
}

/// Render a timestamp the way every transport puts it on the wire
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Normalize a stored timestamp string to its wire form
pub fn normalize_timestamp(value: &str) -> Result<String, Error> {
    parse_timestamp(value).map(|dt| format_timestamp(&dt))
}

/// Build a timestamp from protobuf-style seconds and nanos
pub fn timestamp_from_unix(seconds: i64, nanos: i32) -> Result<DateTime<Utc>, Error> {
    u32::try_from(nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(seconds, nanos))
        .ok_or_else(|| {
            Error::invalid_argument(format!("timestamp out of range: {seconds}s {nanos}ns"))
        })
}

/// `Content-Disposition` value announcing a download name
#[must_use]
pub fn content_disposition(name: &str) -> String {
    format!("attachment; filename={name}")
}

/// Extract the download name from a `Content-Disposition` value.
///
/// Takes the text after `filename=` up to the next `;`, strips surrounding
/// quotes, and falls back to [`DEFAULT_FILE_NAME`].
#[must_use]
pub fn filename_from_disposition(header: Option<&str>) -> String {
    header
        .and_then(|value| value.split_once("filename="))
        .map(|(_, rest)| rest.split(';').next().unwrap_or_default().trim())
        .map(|name| name.trim_matches('"'))
        .filter(|name| !name.is_empty())
        .map_or_else(|| DEFAULT_FILE_NAME.to_string(), str::to_string)
}
