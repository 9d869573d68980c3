//! Shared harness: both transports on ephemeral ports over one service

#![allow(dead_code)]

use bytes::Bytes;
use filesvc_common::{ClientConfig, FileId};
use filesvc_meta_store::{ContentLocator, FileRecord, FileService};
use filesvc_server::config::ServerConfig;
use filesvc_server::{serve_grpc, serve_rest};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub const EXAMPLE_CONTENT: &[u8] = b"This is a test file.";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("filesvc=debug")
        .with_test_writer()
        .try_init();
}

pub struct TestServer {
    pub rest_url: String,
    pub grpc_addr: String,
    pub files: Arc<FileService>,
    pub dir: TempDir,
    _shutdown: watch::Sender<bool>,
}

impl TestServer {
    /// Client configuration pointing at this server
    pub fn client_config(&self, backend: &str) -> ClientConfig {
        ClientConfig {
            backend: backend.to_string(),
            base_url: self.rest_url.clone(),
            grpc_server: self.grpc_addr.clone(),
            timeout: Some(std::time::Duration::from_secs(10)),
        }
    }

    pub fn stat_url(&self, id: &str) -> String {
        format!("{}/file/{}/stat/", self.rest_url, id)
    }

    pub fn read_url(&self, id: &str) -> String {
        format!("{}/file/{}/read/", self.rest_url, id)
    }
}

fn record(id: &str, name: &str, created: &str, mimetype: &str, locator: ContentLocator) -> FileRecord {
    FileRecord {
        id: FileId::new(id).unwrap(),
        name: name.to_string(),
        size: 12345,
        create_datetime: created.to_string(),
        mimetype: mimetype.to_string(),
        locator,
    }
}

/// Fixture files:
///
/// - `1234`: example.txt on disk, registered size 12345
/// - `big`: 10 bytes in memory
/// - `bad-date`: unparseable creation time
/// - `gone`: path that does not exist
/// - `empty`: zero-length content
pub fn fixture_service(dir: &TempDir) -> FileService {
    let path = dir.path().join("example.txt");
    std::fs::write(&path, EXAMPLE_CONTENT).unwrap();

    let files = FileService::default();
    files.add(record(
        "1234",
        "example.txt",
        "2023-09-20T12:34:56Z",
        "text/plain",
        ContentLocator::Path(path),
    ));
    files.add(record(
        "big",
        "big.bin",
        "2023-09-20T12:34:56.500Z",
        "application/octet-stream",
        ContentLocator::Memory(Bytes::from_static(b"0123456789")),
    ));
    files.add(record(
        "bad-date",
        "bad.txt",
        "not-a-date",
        "text/plain",
        ContentLocator::Memory(Bytes::from_static(b"x")),
    ));
    files.add(record(
        "gone",
        "gone.txt",
        "2023-09-20T12:34:56Z",
        "text/plain",
        ContentLocator::Path(dir.path().join("gone.txt")),
    ));
    files.add(record(
        "empty",
        "empty.txt",
        "2023-09-20T12:34:56Z",
        "text/plain",
        ContentLocator::Memory(Bytes::new()),
    ));
    files
}

async fn wait_for(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Start both transports with the fixture files and the given chunk size
pub async fn start(chunk_size: usize) -> TestServer {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let files = Arc::new(fixture_service(&dir));
    let config = ServerConfig {
        rest_listen: "127.0.0.1:0".to_string(),
        grpc_listen: "127.0.0.1:0".to_string(),
        chunk_size,
        ..ServerConfig::default()
    };

    let rest_listener = TcpListener::bind(&config.rest_listen).await.unwrap();
    let grpc_listener = TcpListener::bind(&config.grpc_listen).await.unwrap();
    let rest_url = format!("http://{}", rest_listener.local_addr().unwrap());
    let grpc_addr = grpc_listener.local_addr().unwrap().to_string();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(serve_rest(
        rest_listener,
        files.clone(),
        wait_for(shutdown_rx.clone()),
    ));
    let grpc_files = files.clone();
    tokio::spawn(async move {
        serve_grpc(grpc_listener, grpc_files, &config, wait_for(shutdown_rx)).await
    });

    TestServer {
        rest_url,
        grpc_addr,
        files,
        dir,
        _shutdown: shutdown_tx,
    }
}
