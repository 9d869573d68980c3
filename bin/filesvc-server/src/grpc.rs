//! gRPC adapter for the `File` service

use filesvc_common::{Error, content_disposition, parse_timestamp};
use filesvc_meta_store::{Content, FileService};
use filesvc_proto::file::stat_reply;
use filesvc_proto::{File, ReadReply, ReadRequest, StatReply, StatRequest, Uuid};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::metadata::AsciiMetadataValue;
use tonic::{Request, Response, Status};
use tracing::{debug, error, warn};

/// Default content slice per read reply
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Metadata key carrying the download name of a read
pub const CONTENT_DISPOSITION_KEY: &str = "content-disposition";

/// Replies buffered ahead of a slow reader
const STREAM_BUFFER: usize = 4;

/// Serves stat and chunked read over gRPC
pub struct FileGrpcService {
    files: Arc<FileService>,
    chunk_size: usize,
}

impl FileGrpcService {
    /// A `chunk_size` of zero falls back to the default.
    pub fn new(files: Arc<FileService>, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self { files, chunk_size }
    }
}

/// Convert a service error into a gRPC status
pub fn status_from_error(err: Error) -> Status {
    match err {
        Error::NotFound(_) => Status::not_found(err.to_string()),
        Error::InvalidArgument(msg) => Status::invalid_argument(msg),
        Error::Storage(_) | Error::Io(_) => Status::failed_precondition(err.to_string()),
        _ => Status::internal(err.to_string()),
    }
}

fn request_id(uuid: Option<Uuid>) -> Result<String, Status> {
    uuid.map(|u| u.value)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Status::invalid_argument("missing uuid"))
}

#[tonic::async_trait]
impl File for FileGrpcService {
    async fn stat(&self, request: Request<StatRequest>) -> Result<Response<StatReply>, Status> {
        let id = request_id(request.into_inner().uuid)?;
        debug!("gRPC stat {}", id);

        let record = self.files.get_metadata(&id).await.map_err(status_from_error)?;
        let created = parse_timestamp(&record.create_datetime).map_err(|e| {
            warn!("Record {} has unparseable create_datetime: {}", id, e);
            Status::invalid_argument("Invalid datetime format")
        })?;
        let size = i64::try_from(record.size)
            .map_err(|_| Status::out_of_range(format!("size of {id} does not fit int64")))?;
        let nanos = i32::try_from(created.timestamp_subsec_nanos())
            .map_err(|_| Status::internal("timestamp nanos out of range"))?;

        Ok(Response::new(StatReply {
            data: Some(stat_reply::Data {
                name: record.name,
                size,
                create_datetime: Some(prost_types::Timestamp {
                    seconds: created.timestamp(),
                    nanos,
                }),
                mimetype: record.mimetype,
            }),
        }))
    }

    #[allow(non_camel_case_types)]
    type readStream = ReceiverStream<Result<ReadReply, Status>>;

    async fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> Result<Response<Self::readStream>, Status> {
        let id = request_id(request.into_inner().uuid)?;
        debug!("gRPC read {}", id);

        // Resolve before the stream starts so lookup failures surface as
        // the call status rather than a mid-stream error.
        let (record, content) = self.files.open(&id).await.map_err(status_from_error)?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(stream_content(id, content, self.chunk_size, tx));

        let mut response = Response::new(ReceiverStream::new(rx));
        match content_disposition(&record.name).parse::<AsciiMetadataValue>() {
            Ok(value) => {
                response
                    .metadata_mut()
                    .insert(CONTENT_DISPOSITION_KEY, value);
            }
            Err(_) => debug!("Name of {} is not ASCII, omitting content-disposition", record.id),
        }
        Ok(response)
    }
}

/// Pump `content` into the reply channel in slices of at most `chunk_size`.
///
/// Stops quietly when the receiver goes away; the content is dropped with
/// the task either way.
async fn stream_content(
    id: String,
    mut content: Content,
    chunk_size: usize,
    tx: mpsc::Sender<Result<ReadReply, Status>>,
) {
    let limit = u64::try_from(chunk_size).unwrap_or(u64::MAX);
    let mut sent = 0usize;
    let mut chunks = 0usize;

    loop {
        let mut buf = Vec::with_capacity(chunk_size);
        match (&mut content).take(limit).read_to_end(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                sent += n;
                chunks += 1;
                if tx.send(Ok(ReadReply::chunk(buf))).await.is_err() {
                    debug!("Reader of {} went away after {} bytes", id, sent);
                    return;
                }
            }
            Err(e) => {
                error!("Read of {} failed after {} bytes: {}", id, sent, e);
                let _ = tx
                    .send(Err(Status::failed_precondition(format!(
                        "failed to read content of {id}: {e}"
                    ))))
                    .await;
                return;
            }
        }
    }

    debug!("Streamed {} bytes of {} in {} chunks", sent, id, chunks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use filesvc_common::FileId;
    use filesvc_meta_store::{ContentLocator, FileRecord};
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};
    use tokio_stream::StreamExt;
    use tonic::Code;

    /// Endless content that records when it is dropped
    struct TrackedReader {
        dropped: Arc<AtomicBool>,
    }

    impl AsyncRead for TrackedReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let n = buf.remaining().min(16);
            buf.put_slice(&[b'x'; 16][..n]);
            Poll::Ready(Ok(()))
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn tracked_content() -> (Content, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let reader = TrackedReader {
            dropped: dropped.clone(),
        };
        (Content::new(reader, u64::MAX), dropped)
    }

    fn service(chunk_size: usize) -> FileGrpcService {
        let files = FileService::default();
        files.add(FileRecord {
            id: FileId::new("mem").unwrap(),
            name: "mem.bin".to_string(),
            size: 10,
            create_datetime: "2023-09-20T12:34:56Z".to_string(),
            mimetype: "application/octet-stream".to_string(),
            locator: ContentLocator::Memory(Bytes::from_static(b"0123456789")),
        });
        files.add(FileRecord {
            id: FileId::new("bad-date").unwrap(),
            name: "bad.txt".to_string(),
            size: 1,
            create_datetime: "yesterday".to_string(),
            mimetype: "text/plain".to_string(),
            locator: ContentLocator::Memory(Bytes::from_static(b"x")),
        });
        files.add(FileRecord {
            id: FileId::new("empty").unwrap(),
            name: "empty.txt".to_string(),
            size: 0,
            create_datetime: "2023-09-20T12:34:56Z".to_string(),
            mimetype: "text/plain".to_string(),
            locator: ContentLocator::Memory(Bytes::new()),
        });
        FileGrpcService::new(Arc::new(files), chunk_size)
    }

    async fn collect(stream: ReceiverStream<Result<ReadReply, Status>>) -> Vec<Vec<u8>> {
        stream
            .map(|r| r.unwrap().data.unwrap().data)
            .collect::<Vec<_>>()
            .await
    }

    #[tokio::test]
    async fn test_stat() {
        let reply = service(4)
            .stat(Request::new(StatRequest::for_id("mem")))
            .await
            .unwrap()
            .into_inner();
        let data = reply.data.unwrap();
        assert_eq!(data.name, "mem.bin");
        assert_eq!(data.size, 10);
        assert_eq!(data.create_datetime.unwrap().seconds, 1_695_213_296);
    }

    #[tokio::test]
    async fn test_stat_errors() {
        let svc = service(4);
        let status = svc
            .stat(Request::new(StatRequest::for_id("nope")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let status = svc
            .stat(Request::new(StatRequest { uuid: None }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = svc
            .stat(Request::new(StatRequest::for_id("bad-date")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Invalid datetime format");
    }

    #[tokio::test]
    async fn test_read_chunks() {
        let response = service(4)
            .read(Request::new(ReadRequest::for_id("mem")))
            .await
            .unwrap();
        assert_eq!(
            response
                .metadata()
                .get(CONTENT_DISPOSITION_KEY)
                .unwrap()
                .to_str()
                .unwrap(),
            "attachment; filename=mem.bin"
        );
        let chunks = collect(response.into_inner()).await;
        assert_eq!(
            chunks,
            vec![b"0123".to_vec(), b"4567".to_vec(), b"89".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_read_empty_content() {
        let response = service(4)
            .read(Request::new(ReadRequest::for_id("empty")))
            .await
            .unwrap();
        assert!(collect(response.into_inner()).await.is_empty());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let status = service(4)
            .read(Request::new(ReadRequest::for_id("nope")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[test]
    fn test_status_from_error() {
        assert_eq!(
            status_from_error(Error::not_found("x")).code(),
            Code::NotFound
        );
        assert_eq!(
            status_from_error(Error::invalid_argument("bad")).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            status_from_error(Error::storage("disk")).code(),
            Code::FailedPrecondition
        );
    }

    #[tokio::test]
    async fn test_stream_stops_when_reader_goes_away() {
        let (content, dropped) = tracked_content();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        tokio::spawn(stream_content("endless".to_string(), content, 4, tx))
            .await
            .unwrap();
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_stops_when_reader_leaves_mid_stream() {
        let (content, dropped) = tracked_content();
        let (tx, mut rx) = mpsc::channel(1);

        let task = tokio::spawn(stream_content("endless".to_string(), content, 4, tx));
        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.data.unwrap().data.len(), 4);
        drop(rx);

        task.await.unwrap();
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_zero_chunk_size_uses_default() {
        assert_eq!(service(0).chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
