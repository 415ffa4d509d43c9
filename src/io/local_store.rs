use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, BufReader};

use super::byte_reader::ByteReader;
use super::object_store::{ObjectStore, ObjectSummary, dir_prefix};

/// ObjectStore implementation over a local directory tree
///
/// Keys are paths relative to `root`, always separated by `/`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    name: String,
}

impl LocalObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let name = root.display().to_string();
        Self { root, name }
    }

    fn path_of(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Collect every regular file below `dir`, keyed relative to the root
    async fn walk(&self, dir_key: &str, objects: &mut Vec<ObjectSummary>) -> Result<()> {
        let mut pending = vec![dir_key.to_string()];

        while let Some(current) = pending.pop() {
            let mut entries = match fs::read_dir(self.path_of(&current)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to read directory {}", self.path_of(&current).display())
                    });
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let key = format!("{}{}", current, name);
                let metadata = entry.metadata().await?;

                if metadata.is_dir() {
                    pending.push(format!("{}/", key));
                } else if metadata.is_file() {
                    let last_modified: DateTime<Utc> = metadata
                        .modified()
                        .with_context(|| format!("No modification time for {}", key))?
                        .into();
                    objects.push(ObjectSummary { key, last_modified });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn bucket(&self) -> &str {
        &self.name
    }

    fn location(&self, key: &str) -> String {
        format!("file://{}", self.path_of(key).display())
    }

    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = dir_prefix(prefix);
        let mut entries = match fs::read_dir(self.path_of(&prefix)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to list local directory"),
        };

        let mut prefixes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.metadata().await?.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                prefixes.push(format!("{}{}/", prefix, name));
            }
        }

        prefixes.sort();
        Ok(prefixes)
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        // S3 prefixes are plain string prefixes, so start from the deepest
        // complete directory and filter
        let dir_key = match prefix.rfind('/') {
            Some(pos) => prefix[..=pos].to_string(),
            None => String::new(),
        };

        let mut objects = Vec::new();
        self.walk(&dir_key, &mut objects).await?;

        objects.retain(|o| o.key.starts_with(prefix));
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match fs::metadata(self.path_of(key)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to check {}", key)),
        }
    }

    fn reader(&self, key: &str) -> Box<dyn ByteReader> {
        Box::new(LocalFileByteReader::new(self.path_of(key)))
    }
}

/// ByteReader implementation for local files
#[derive(Clone)]
pub struct LocalFileByteReader {
    file_path: PathBuf,
}

impl LocalFileByteReader {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ByteReader for LocalFileByteReader {
    async fn size(&self) -> Result<u64> {
        let file = File::open(&self.file_path)
            .await
            .context("Failed to open file")?;
        let size = file.metadata().await?.len();
        Ok(size)
    }

    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let file = File::open(&self.file_path)
            .await
            .context("Failed to open file for reading")?;

        let mut file = BufReader::new(file);
        file.seek(std::io::SeekFrom::Start(start)).await?;

        let size = end.saturating_sub(start) as usize;
        let mut buffer = vec![0u8; size];
        file.read_exact(&mut buffer).await?;

        Ok(buffer)
    }
}
