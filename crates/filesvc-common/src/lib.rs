//! filesvc Common - Shared types and utilities
//!
//! This crate provides the file metadata types, error definitions, and
//! configuration used by both the server adapters and the client backends.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BackendKind, ClientConfig};
pub use error::{Error, Result, TransportStatus};
pub use types::*;
