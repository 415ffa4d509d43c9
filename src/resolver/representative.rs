use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::config::{IGNORE_PATTERNS, PARTITION_PATTERN, SUCCESS_MARKER};
use crate::io::{ObjectStore, ObjectSummary, join_key};

/// Keys that never take part in schema selection
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    patterns: Vec<Regex>,
}

impl IgnoreRules {
    /// The fixed ignore rules plus the caller's exclusions
    ///
    /// Every pattern must match from the start of the key.
    pub fn new(exclude_patterns: &[String]) -> Result<Self> {
        let patterns = IGNORE_PATTERNS
            .iter()
            .copied()
            .chain(exclude_patterns.iter().map(String::as_str))
            .map(|pattern| {
                Regex::new(&format!("^(?:{})", pattern))
                    .with_context(|| format!("Invalid exclude pattern: {}", pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(key))
    }
}

/// Success marker lookups, keyed by (bucket, directory)
///
/// Lives for one top-level invocation and is never invalidated.
#[derive(Debug, Default)]
pub struct SuccessMarkerCache {
    entries: HashMap<(String, String), bool>,
}

impl SuccessMarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `dir` holds a success marker
    pub async fn has_marker(&mut self, store: &dyn ObjectStore, dir: &str) -> Result<bool> {
        let cache_key = (store.bucket().to_string(), dir.to_string());
        if let Some(&exists) = self.entries.get(&cache_key) {
            return Ok(exists);
        }

        let marker = join_key(dir, SUCCESS_MARKER);
        let exists = store
            .exists(&marker)
            .await
            .with_context(|| format!("Failed to check {}", store.location(&marker)))?;
        debug!("Success marker {}: {}", marker, exists);

        self.entries.insert(cache_key, exists);
        Ok(exists)
    }
}

/// Outcome of choosing a version's representative object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Found(ObjectSummary),
    /// Nothing was left after the ignore rules and exclusions
    Empty,
    /// Keys passed the filters but none sits next to a success marker
    MissingSuccessMarker,
}

/// Pick the object whose schema stands for the whole version
///
/// The most recently modified eligible key wins. When several keys share the
/// newest timestamp, the one listed last wins, so the choice depends on
/// listing order.
pub async fn select_representative(
    store: &dyn ObjectStore,
    version_prefix: &str,
    rules: &IgnoreRules,
    success_only: bool,
    markers: &mut SuccessMarkerCache,
) -> Result<Selection> {
    let objects = store
        .list_objects(version_prefix)
        .await
        .with_context(|| format!("Failed to list {}", store.location(version_prefix)))?;

    let mut candidates: Vec<(usize, ObjectSummary)> = objects
        .into_iter()
        .enumerate()
        .filter(|(_, object)| !rules.is_ignored(&object.key))
        .collect();

    if candidates.is_empty() {
        return Ok(Selection::Empty);
    }

    // Newest first; among equal timestamps, later listing position first
    candidates.sort_by(|(a_pos, a), (b_pos, b)| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| b_pos.cmp(a_pos))
    });

    for (_, object) in candidates {
        if !success_only || markers.has_marker(store, parent_dir(&object.key)).await? {
            return Ok(Selection::Found(object));
        }
    }

    Ok(Selection::MissingSuccessMarker)
}

fn parent_dir(key: &str) -> &str {
    key.rfind('/').map_or("", |pos| &key[..pos])
}

/// Partition column names from the part of a key below its version prefix
///
/// `sample_id=1/test_id=3/part-0.parquet` gives `["sample_id", "test_id"]`.
pub fn partition_fields(key_suffix: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(PARTITION_PATTERN).context("Invalid partition pattern")?;
    let dirs = parent_dir(key_suffix);

    Ok(pattern
        .captures_iter(dirs)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect())
}
