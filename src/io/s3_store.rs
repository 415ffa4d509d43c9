use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::DateTime as S3DateTime;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::byte_reader::ByteReader;
use super::object_store::{ObjectStore, ObjectSummary};
use crate::config::{MAX_LISTED_OBJECTS, PATH_DELIMITER};

/// ObjectStore implementation for one S3 bucket
#[derive(Clone)]
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store over an existing client
    pub fn new(s3_client: Arc<S3Client>, bucket: impl Into<String>) -> Self {
        Self {
            s3_client,
            bucket: bucket.into(),
        }
    }

    /// Create a store from shared AWS config, optionally pointed at an
    /// S3-compatible endpoint (which then requires path-style addressing)
    pub fn from_config(
        aws_config: &SdkConfig,
        endpoint_url: Option<&str>,
        bucket: impl Into<String>,
    ) -> Self {
        let s3_config = match endpoint_url {
            Some(endpoint) => aws_sdk_s3::config::Builder::from(aws_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build(),
            None => aws_sdk_s3::config::Builder::from(aws_config).build(),
        };
        Self::new(Arc::new(S3Client::from_conf(s3_config)), bucket)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let mut prefixes = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .s3_client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter(PATH_DELIMITER)
                .max_keys(MAX_LISTED_OBJECTS)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .with_context(|| format!("Failed to list prefixes under s3://{}/{}", self.bucket, prefix))?;

            prefixes.extend(
                response
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or_default() => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(prefixes)
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let response = self
                .s3_client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .max_keys(MAX_LISTED_OBJECTS)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .with_context(|| format!("Failed to list objects under s3://{}/{}", self.bucket, prefix))?;
            pages += 1;

            for object in response.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                let last_modified = object
                    .last_modified()
                    .ok_or_else(|| anyhow!("S3 object {} missing last-modified", key))
                    .and_then(to_chrono)?;
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    last_modified,
                });
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or_default() => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(prefix, pages, objects = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self
            .s3_client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(err).with_context(|| format!("Failed to check s3://{}/{}", self.bucket, key)),
        }
    }

    fn reader(&self, key: &str) -> Box<dyn ByteReader> {
        Box::new(S3ByteReader::new(
            Arc::clone(&self.s3_client),
            self.bucket.clone(),
            key.to_string(),
        ))
    }
}

fn to_chrono(timestamp: &S3DateTime) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
        .ok_or_else(|| anyhow!("S3 timestamp out of range: {:?}", timestamp))
}

/// ByteReader implementation for S3 objects
#[derive(Clone)]
pub struct S3ByteReader {
    s3_client: Arc<S3Client>,
    bucket: String,
    key: String,
}

impl S3ByteReader {
    /// Create a new S3ByteReader
    pub fn new(s3_client: Arc<S3Client>, bucket: String, key: String) -> Self {
        Self {
            s3_client,
            bucket,
            key,
        }
    }
}

#[async_trait]
impl ByteReader for S3ByteReader {
    async fn size(&self) -> Result<u64> {
        // Use HeadObject to get object size
        let head_response = self
            .s3_client
            .head_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .context("Failed to get S3 object metadata")?;

        let size = head_response
            .content_length()
            .ok_or_else(|| anyhow!("S3 object missing content-length"))?;

        u64::try_from(size).context("S3 object has negative content-length")
    }

    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        if start >= end {
            return Ok(Vec::new());
        }

        // HTTP ranges are inclusive on both ends
        let range = format!("bytes={}-{}", start, end - 1);

        let response = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .range(range)
            .send()
            .await
            .context("Failed to read range from S3")?;

        let bytes = response
            .body
            .collect()
            .await
            .context("Failed to collect S3 response body")?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chrono_keeps_subsecond_precision() {
        let timestamp = S3DateTime::from_secs_and_nanos(1_474_243_200, 500_000_000);
        let converted = to_chrono(&timestamp).unwrap();

        assert_eq!(converted.timestamp(), 1_474_243_200);
        assert_eq!(converted.timestamp_subsec_millis(), 500);
    }
}
