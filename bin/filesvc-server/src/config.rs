//! Server configuration file.
//!
//! ```toml
//! [server]
//! rest_listen = "0.0.0.0:5000"
//! grpc_listen = "0.0.0.0:50051"
//! chunk_size = 65536
//! max_concurrent_requests = 10
//! data_dir = "/srv/files"
//!
//! [logging]
//! level = "info"
//!
//! [[files]]
//! id = "1234"
//! name = "example.txt"
//! size = 12345
//! mimetype = "text/plain"
//! create_datetime = "2023-09-20T12:34:56Z"
//! path = "example.txt"
//! ```

use crate::grpc::DEFAULT_CHUNK_SIZE;
use chrono::{DateTime, Utc};
use filesvc_common::{Error, FileId, format_timestamp};
use filesvc_meta_store::{ContentLocator, FileRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration file structure
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Files registered at startup
    #[serde(default = "default_files")]
    pub files: Vec<SeedFile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            files: default_files(),
        }
    }
}

impl Config {
    /// Load the configuration file, or defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))
    }
}

/// Listener and transport settings
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_rest_listen")]
    pub rest_listen: String,
    #[serde(default = "default_grpc_listen")]
    pub grpc_listen: String,
    /// Largest content slice sent in one gRPC read reply
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// gRPC requests served at once across all connections
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Base directory for relative file paths
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rest_listen: default_rest_listen(),
            grpc_listen: default_grpc_listen(),
            chunk_size: default_chunk_size(),
            max_concurrent_requests: default_max_concurrent_requests(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A file to register at startup
#[derive(Clone, Debug, Deserialize)]
pub struct SeedFile {
    pub id: String,
    pub name: String,
    /// Content location; relative paths are resolved against `data_dir`
    pub path: PathBuf,
    /// Registered size; defaults to the size on disk
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default = "default_mimetype")]
    pub mimetype: String,
    /// Registered creation time; defaults to the file's modification time
    #[serde(default)]
    pub create_datetime: Option<String>,
}

impl SeedFile {
    /// Turn the entry into a store record.
    ///
    /// A missing file is not an error: the record is registered and stays
    /// unresolvable until the content appears.
    pub fn into_record(self, data_dir: &Path) -> Result<FileRecord, Error> {
        let id = FileId::new(self.id)?;
        let path = if self.path.is_absolute() {
            self.path
        } else {
            data_dir.join(self.path)
        };
        let on_disk = std::fs::metadata(&path).ok();
        if !on_disk.as_ref().is_some_and(std::fs::Metadata::is_file) {
            warn!("Content for {} not found at {}", id, path.display());
        }

        let size = self
            .size
            .or_else(|| on_disk.as_ref().map(std::fs::Metadata::len))
            .unwrap_or_default();
        let create_datetime = self.create_datetime.unwrap_or_else(|| {
            let modified = on_disk
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map_or_else(Utc::now, DateTime::<Utc>::from);
            format_timestamp(&modified)
        });

        Ok(FileRecord {
            id,
            name: self.name,
            size,
            create_datetime,
            mimetype: self.mimetype,
            locator: ContentLocator::Path(path),
        })
    }
}

fn default_rest_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_grpc_listen() -> String {
    "0.0.0.0:50051".to_string()
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_max_concurrent_requests() -> usize {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mimetype() -> String {
    "application/octet-stream".to_string()
}

fn default_files() -> Vec<SeedFile> {
    vec![SeedFile {
        id: "1234".to_string(),
        name: "example.txt".to_string(),
        path: PathBuf::from("example.txt"),
        size: Some(12345),
        mimetype: "text/plain".to_string(),
        create_datetime: Some("2023-09-20T12:34:56Z".to_string()),
    }]
}
