use anyhow::Result;
use async_trait::async_trait;

/// Abstraction for byte-level reads of a single object
/// This trait lets the footer reader work the same way against S3 objects,
/// local files and in-memory test data
#[async_trait]
pub trait ByteReader: Send + Sync {
    /// Get the total size of the file/object in bytes
    async fn size(&self) -> Result<u64>;

    /// Read the half-open byte range `start..end` from the file/object
    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>>;
}
