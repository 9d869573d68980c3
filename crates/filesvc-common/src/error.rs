//! Error types for filesvc
//!
//! Both transports surface failures through the same taxonomy so callers
//! never need to know which backend produced them.

use std::fmt;
use thiserror::Error;

/// Common result type for filesvc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Status reported by a transport when a request did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    /// HTTP status code from the REST backend
    Http(u16),
    /// Numeric gRPC status code
    Grpc(i32),
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "HTTP {code}"),
            Self::Grpc(code) => write!(f, "gRPC code {code}"),
        }
    }
}

/// Common error type for filesvc
#[derive(Debug, Error)]
pub enum Error {
    // Lookup errors
    #[error("File with UUID {0} not found.")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Network/RPC errors
    #[error("transport error ({status}): {message}")]
    Transport {
        status: TransportStatus,
        message: String,
    },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    // Server-side storage errors
    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Construction errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a not found error for a file identifier
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a transport error carrying the status the peer returned
    pub fn transport(status: TransportStatus, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Get the HTTP status code used by the REST adapter
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidArgument(_) => 400,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // Relay the upstream status when one exists
            Self::Transport {
                status: TransportStatus::Http(code),
                ..
            } => *code,

            // 503 Service Unavailable
            Self::ConnectionFailed(_) => 503,

            // 500 Internal Server Error
            Self::Transport { .. }
            | Self::Deserialization(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Configuration(_) => 500,
        }
    }

    /// Short machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::Transport { .. } => "TransportError",
            Self::ConnectionFailed(_) => "ConnectionFailed",
            Self::Configuration(_) => "ConfigurationError",
            Self::Deserialization(_) | Self::Storage(_) | Self::Io(_) => "InternalError",
        }
    }
}
