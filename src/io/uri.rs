use anyhow::{Result, anyhow};
use std::path::{Component, PathBuf};
use url::Url;

/// A parsed dataset (or dataset-prefix) location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetUri {
    /// `s3://bucket/prefix`, with `prefix` free of leading and trailing `/`
    S3 { bucket: String, prefix: String },
    /// Absolute local directory
    Local(PathBuf),
}

impl DatasetUri {
    /// Parse a URI string into a DatasetUri
    pub fn parse(uri: &str) -> Result<Self> {
        // Try parsing as URL first
        if let Ok(url) = Url::parse(uri) {
            match url.scheme() {
                "s3" => {
                    let bucket = url
                        .host_str()
                        .filter(|host| !host.is_empty())
                        .ok_or_else(|| anyhow!("S3 URI missing bucket: {}", uri))?
                        .to_string();

                    let prefix = url.path().trim_matches('/').to_string();

                    Ok(DatasetUri::S3 { bucket, prefix })
                }
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| anyhow!("Invalid file:// URI: {}", uri))?;
                    Ok(DatasetUri::Local(path))
                }
                scheme if scheme.len() == 1 => {
                    // Windows drive letter parsed as a scheme
                    Self::local(uri)
                }
                scheme => Err(anyhow!("Unsupported URI scheme: {}", scheme)),
            }
        } else {
            // Treat as local file path
            Self::local(uri)
        }
    }

    fn local(path: &str) -> Result<Self> {
        let path = std::path::absolute(path)
            .map_err(|e| anyhow!("Invalid local path '{}': {}", path, e))?;
        Ok(DatasetUri::Local(path))
    }

    /// Key prefix of the location within its store
    ///
    /// Local paths are keyed from the filesystem root, so the prefix is the
    /// absolute path without its root.
    pub fn prefix(&self) -> String {
        match self {
            DatasetUri::S3 { prefix, .. } => prefix.clone(),
            DatasetUri::Local(path) => path
                .components()
                .filter_map(|c| match c {
                    Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
        }
    }
}

impl std::fmt::Display for DatasetUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetUri::S3 { bucket, prefix } if prefix.is_empty() => write!(f, "s3://{}", bucket),
            DatasetUri::S3 { bucket, prefix } => write!(f, "s3://{}/{}", bucket, prefix),
            DatasetUri::Local(path) => write!(f, "file://{}", path.display()),
        }
    }
}
