//! Stored record types

use bytes::Bytes;
use filesvc_common::{FileId, FileMetadata, normalize_timestamp};
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Where the bytes of a file live
#[derive(Clone, PartialEq, Eq)]
pub enum ContentLocator {
    /// Regular file on the local filesystem
    Path(PathBuf),
    /// Bytes held in memory
    Memory(Bytes),
}

impl ContentLocator {
    /// Whether the locator currently points to retrievable bytes
    pub async fn resolves(&self) -> bool {
        match self {
            Self::Path(path) => tokio::fs::metadata(path)
                .await
                .is_ok_and(|meta| meta.is_file()),
            Self::Memory(_) => true,
        }
    }

    /// Open the content for reading
    pub async fn open(&self) -> std::io::Result<Content> {
        match self {
            Self::Path(path) => {
                let file = tokio::fs::File::open(path).await?;
                let meta = file.metadata().await?;
                if !meta.is_file() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} is not a regular file", path.display()),
                    ));
                }
                Ok(Content::new(file, meta.len()))
            }
            Self::Memory(bytes) => Ok(Content::new(Cursor::new(bytes.clone()), bytes.len() as u64)),
        }
    }
}

impl fmt::Debug for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "Path({})", path.display()),
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// A file record as stored by the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique key
    pub id: FileId,
    /// Display name
    pub name: String,
    /// Size in bytes, as registered
    pub size: u64,
    /// Creation time as registered; parsed on every stat
    pub create_datetime: String,
    /// MIME type
    pub mimetype: String,
    /// Server-internal content location, never sent to clients
    pub locator: ContentLocator,
}

impl FileRecord {
    /// Client-visible metadata with the timestamp in wire form.
    ///
    /// Fails with `InvalidArgument` if the stored timestamp does not parse.
    pub fn to_metadata(&self) -> filesvc_common::Result<FileMetadata> {
        Ok(FileMetadata {
            create_datetime: normalize_timestamp(&self.create_datetime)?,
            size: self.size,
            mimetype: self.mimetype.clone(),
            name: self.name.clone(),
        })
    }
}

/// Open file content.
///
/// Owns the underlying handle; dropping the value releases it.
pub struct Content {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    len: u64,
}

impl Content {
    /// Wrap a reader producing `len` bytes
    pub fn new(reader: impl AsyncRead + Send + 'static, len: u64) -> Self {
        Self {
            reader: Box::pin(reader),
            len,
        }
    }

    /// Actual length of the content in bytes
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Whether the content is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsyncRead for Content {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.reader.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content").field("len", &self.len).finish_non_exhaustive()
    }
}
