//! filesvc Protocol - gRPC service definitions
//!
//! This crate contains the protobuf-generated code for the `File`
//! service. The proto file declares no package, so the generated code
//! lives in prost's `_` module and the service paths stay `/File/stat`
//! and `/File/read`.

/// File service (stat and streaming read)
pub mod file {
    #![allow(clippy::all, clippy::pedantic, clippy::nursery)]
    tonic::include_proto!("_");
}

pub use file::file_client::FileClient as FileStub;
pub use file::file_server::{File, FileServer};
pub use file::{ReadReply, ReadRequest, StatReply, StatRequest, Uuid};

impl StatRequest {
    /// Request for the given identifier
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            uuid: Some(Uuid { value: id.into() }),
        }
    }
}

impl ReadRequest {
    /// Request for the given identifier
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            uuid: Some(Uuid { value: id.into() }),
        }
    }
}

impl ReadReply {
    /// Reply carrying one chunk of content
    #[must_use]
    pub fn chunk(data: Vec<u8>) -> Self {
        Self {
            data: Some(file::read_reply::Data { data }),
        }
    }
}
