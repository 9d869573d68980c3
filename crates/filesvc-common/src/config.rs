//! Client configuration types
//!
//! The backend tag is kept as it was supplied (CLI flag, environment, or
//! code) and resolved exactly once when a client is constructed.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default base URL of the REST server
pub const DEFAULT_REST_URL: &str = "http://localhost:5000";

/// Default address of the gRPC server
pub const DEFAULT_GRPC_SERVER: &str = "localhost:50051";

/// Default per-call deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport a client talks to the server with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Synchronous HTTP
    #[default]
    Rest,
    /// gRPC (unary stat, server-streaming read)
    Grpc,
}

impl BackendKind {
    /// Tag as accepted on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Grpc => "grpc",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "grpc" => Ok(Self::Grpc),
            other => Err(Error::configuration(format!(
                "unknown backend: {other:?} (expected \"rest\" or \"grpc\")"
            ))),
        }
    }
}

/// Connection parameters for a file client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend tag, `rest` or `grpc`
    pub backend: String,
    /// Base URL of the REST server
    pub base_url: String,
    /// Host and port (or URI) of the gRPC server
    pub grpc_server: String,
    /// Deadline applied to every call, `None` to wait indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default().as_str().to_string(),
            base_url: DEFAULT_REST_URL.to_string(),
            grpc_server: DEFAULT_GRPC_SERVER.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ClientConfig {
    /// Config for the given backend tag with default endpoints
    pub fn with_backend(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Self::default()
        }
    }

    /// Resolve the backend tag
    pub fn backend_kind(&self) -> Result<BackendKind, Error> {
        self.backend.parse()
    }
}
