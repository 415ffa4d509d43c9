//! In-memory ObjectStore used by unit and integration tests

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::byte_reader::ByteReader;
use super::object_store::{ObjectStore, ObjectSummary};

/// Bucket held in a sorted map, listed lexicographically like S3
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    bucket: String,
    objects: BTreeMap<String, (Vec<u8>, DateTime<Utc>)>,
    exists_calls: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..Default::default()
        }
    }

    /// Add an object modified `modified_secs` seconds after a fixed instant
    pub fn put(&mut self, key: &str, data: impl Into<Vec<u8>>, modified_secs: i64) {
        let last_modified = Utc
            .timestamp_opt(1_474_243_200 + modified_secs, 0)
            .single()
            .unwrap();
        self.objects
            .insert(key.to_string(), (data.into(), last_modified));
    }

    pub fn with(mut self, key: &str, data: impl Into<Vec<u8>>, modified_secs: i64) -> Self {
        self.put(key, data, modified_secs);
        self
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let prefixes: BTreeSet<String> = self
            .objects
            .keys()
            .filter_map(|key| key.strip_prefix(prefix))
            .filter_map(|rest| rest.find('/').map(|pos| format!("{}{}", prefix, &rest[..=pos])))
            .collect();
        Ok(prefixes.into_iter().collect())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        Ok(self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, (_, last_modified))| ObjectSummary {
                key: key.clone(),
                last_modified: *last_modified,
            })
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.contains_key(key))
    }

    fn reader(&self, key: &str) -> Box<dyn ByteReader> {
        let data = self
            .objects
            .get(key)
            .map(|(data, _)| data.clone())
            .unwrap_or_default();
        Box::new(MemoryByteReader { data })
    }
}

/// ByteReader over bytes already held in memory
#[derive(Debug, Clone)]
pub struct MemoryByteReader {
    pub data: Vec<u8>,
}

#[async_trait]
impl ByteReader for MemoryByteReader {
    async fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let end = std::cmp::min(end as usize, self.data.len());
        let start = std::cmp::min(start as usize, end);
        Ok(self.data[start..end].to_vec())
    }
}
