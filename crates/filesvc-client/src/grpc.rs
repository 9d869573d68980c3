//! gRPC transport

use crate::backend::FileBackend;
use async_trait::async_trait;
use bytes::BytesMut;
use filesvc_common::{
    BackendKind, Error, FileContent, FileMetadata, Result, TransportStatus,
    filename_from_disposition, format_timestamp, timestamp_from_unix,
};
use filesvc_proto::{FileStub, ReadRequest, StatRequest};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::debug;

/// Metadata key the server uses to announce the download name of a read
pub const CONTENT_DISPOSITION_KEY: &str = "content-disposition";

/// Client for the `File` gRPC service.
///
/// Holds a single channel; there is no pooling or reconnect logic beyond
/// what the channel itself does.
pub struct GrpcBackend {
    stub: FileStub<Channel>,
}

impl GrpcBackend {
    /// Create a gRPC backend for `host:port` or a full `http://` URI.
    ///
    /// The channel connects lazily on the first call, so this performs no
    /// network I/O. Must be called from within a Tokio runtime.
    pub fn new(server: &str, timeout: Option<Duration>) -> Result<Self> {
        let uri = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{server}")
        };
        let mut endpoint = Endpoint::from_shared(uri).map_err(|e| {
            Error::configuration(format!("invalid gRPC server address {server:?}: {e}"))
        })?;
        if let Some(timeout) = timeout {
            endpoint = endpoint.timeout(timeout);
        }

        Ok(Self::from_channel(endpoint.connect_lazy()))
    }

    /// Wrap an existing channel
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            stub: FileStub::new(channel),
        }
    }
}

/// Sort a gRPC status into the error taxonomy
fn error_from_status(status: &Status, id: &str) -> Error {
    match status.code() {
        Code::NotFound => Error::not_found(id),
        Code::InvalidArgument => Error::invalid_argument(status.message()),
        code => Error::transport(TransportStatus::Grpc(i32::from(code)), status.message()),
    }
}

#[async_trait]
impl FileBackend for GrpcBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Grpc
    }

    async fn stat(&self, id: &str) -> Result<FileMetadata> {
        let reply = self
            .stub
            .clone()
            .stat(StatRequest::for_id(id))
            .await
            .map_err(|s| error_from_status(&s, id))?
            .into_inner();

        let data = reply
            .data
            .ok_or_else(|| Error::Deserialization(format!("stat reply for {id} has no data")))?;
        let created = data.create_datetime.ok_or_else(|| {
            Error::Deserialization(format!("stat reply for {id} has no create_datetime"))
        })?;
        let created = timestamp_from_unix(created.seconds, created.nanos)?;
        let size = u64::try_from(data.size).map_err(|_| {
            Error::Deserialization(format!("stat reply for {id} has negative size {}", data.size))
        })?;

        Ok(FileMetadata {
            create_datetime: format_timestamp(&created),
            size,
            mimetype: data.mimetype,
            name: data.name,
        })
    }

    async fn read(&self, id: &str) -> Result<FileContent> {
        let response = self
            .stub
            .clone()
            .read(ReadRequest::for_id(id))
            .await
            .map_err(|s| error_from_status(&s, id))?;

        let name = filename_from_disposition(
            response
                .metadata()
                .get(CONTENT_DISPOSITION_KEY)
                .and_then(|v| v.to_str().ok()),
        );

        // Every chunk counts: the content is the concatenation of all
        // replies in arrival order.
        let mut stream = response.into_inner();
        let mut data = BytesMut::new();
        let mut chunks = 0usize;
        while let Some(reply) = stream
            .message()
            .await
            .map_err(|s| error_from_status(&s, id))?
        {
            if let Some(chunk) = reply.data {
                data.extend_from_slice(&chunk.data);
            }
            chunks += 1;
        }

        debug!("Read {} bytes of {} in {} chunks", data.len(), id, chunks);
        Ok(FileContent {
            name,
            data: data.freeze(),
        })
    }
}
