//! I/O abstraction layer for listing and reading objects from different stores

pub mod byte_reader;
pub mod local_store;
#[cfg(test)]
pub mod memory_store;
pub mod object_store;
pub mod s3_store;
pub mod uri;

pub use byte_reader::ByteReader;
pub use local_store::LocalObjectStore;
pub use object_store::{ObjectStore, ObjectSummary, dir_prefix, join_key};
pub use s3_store::S3ObjectStore;
pub use uri::DatasetUri;
