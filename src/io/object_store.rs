use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::byte_reader::ByteReader;

/// One listed object: its full key and modification time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Listing and reading operations the resolver needs from a bucket
///
/// Keys use `/` as the path separator on every backend. Prefixes passed to
/// `list_prefixes` should end with `/`; the returned prefixes always do.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket (or root directory) this store reads from
    fn bucket(&self) -> &str;

    /// Fully qualified location of a key, as written into `location '...'`
    fn location(&self, key: &str) -> String;

    /// List the immediate sub-prefixes under `prefix` (delimiter `/`)
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>>;

    /// List every object under `prefix`, following pagination to the end
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>>;

    /// Check whether an object exists at exactly `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Open a byte reader over the object at `key`
    fn reader(&self, key: &str) -> Box<dyn ByteReader>;
}

/// Join a prefix and a relative path with exactly one `/` between them
pub fn join_key(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Turn a prefix into a directory prefix ending with `/` (empty stays empty)
pub fn dir_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}
