//! filesvc Client - stat and read files over REST or gRPC
//!
//! [`FileClient`] picks one transport when it is constructed and exposes
//! the same two operations regardless of which one is active.

pub mod backend;
pub mod client;
pub mod grpc;
pub mod rest;

// Re-exports
pub use backend::{Backend, FileBackend};
pub use client::FileClient;
pub use grpc::GrpcBackend;
pub use rest::RestBackend;
