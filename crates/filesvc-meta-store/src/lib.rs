//! filesvc Metadata Store - file records and lookup
//!
//! This crate holds the server-side table of file records and the
//! [`FileService`] both protocol adapters share.

pub mod service;
pub mod store;
pub mod types;

// Re-exports
pub use service::FileService;
pub use store::MetadataStore;
pub use types::{Content, ContentLocator, FileRecord};
