use anyhow::{Context, Result};
use regex::Regex;
use std::cmp::Ordering;

use crate::config::VERSION_PATTERN;
use crate::io::{ObjectStore, dir_prefix};

use super::SkipReason;

/// List the versions of the dataset rooted at `dataset_prefix`, newest first,
/// along with the sub-prefixes that were rejected
pub async fn resolve_versions(
    store: &dyn ObjectStore,
    dataset_prefix: &str,
) -> Result<(Vec<String>, Vec<SkipReason>)> {
    let root = dir_prefix(dataset_prefix);
    let candidates = store
        .list_prefixes(&root)
        .await
        .with_context(|| format!("Failed to list versions under {}", store.location(&root)))?;

    accept_versions(dataset_prefix, &candidates)
}

/// Keep the candidate prefixes that are versions of `dataset_prefix`
///
/// Returns the accepted version names sorted by descending number, and a
/// diagnostic for every rejected candidate.
pub fn accept_versions(
    dataset_prefix: &str,
    candidates: &[String],
) -> Result<(Vec<String>, Vec<SkipReason>)> {
    let version_re = Regex::new(VERSION_PATTERN).context("Invalid version pattern")?;
    let root = dataset_prefix.trim_matches('/');
    let mut versions = Vec::new();
    let mut skipped = Vec::new();

    for candidate in candidates {
        let segments: Vec<&str> = candidate.split('/').filter(|s| !s.is_empty()).collect();
        let Some((version, parents)) = segments.split_last() else {
            skipped.push(SkipReason::IncompatibleVersioning {
                candidate: candidate.clone(),
            });
            continue;
        };
        if parents.is_empty() {
            skipped.push(SkipReason::IncompatibleVersioning {
                candidate: candidate.clone(),
            });
            continue;
        }

        let parent = parents.join("/");
        if parent != root {
            skipped.push(SkipReason::NestedDataset {
                dataset_prefix: parent,
            });
            continue;
        }

        if !version_re.is_match(version) {
            skipped.push(SkipReason::IncompatibleVersioning {
                candidate: candidate.clone(),
            });
            continue;
        }

        versions.push(version.to_string());
    }

    versions.sort_by(|a, b| compare_version_numbers(b, a));
    Ok((versions, skipped))
}

/// Numeric comparison of two `v<digits>` names, without overflow
fn compare_version_numbers(a: &str, b: &str) -> Ordering {
    let digits = |v: &str| v[1..].trim_start_matches('0').to_string();
    let (a, b) = (digits(a), digits(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_store::InMemoryObjectStore;

    fn prefixes(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_versions_sorted_numerically_descending() {
        let (versions, skipped) = accept_versions(
            "churn",
            &prefixes(&["churn/v2/", "churn/v10/", "churn/v1/"]),
        )
        .unwrap();
        assert_eq!(versions, vec!["v10", "v2", "v1"]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_rejects_non_version_names() {
        let (versions, skipped) = accept_versions(
            "prefix",
            &prefixes(&["prefix/24/", "prefix/version1/", "prefix/v1a/", "prefix/v3/"]),
        )
        .unwrap();
        assert_eq!(versions, vec!["v3"]);
        assert_eq!(skipped.len(), 3);
        assert!(
            skipped
                .iter()
                .all(|s| matches!(s, SkipReason::IncompatibleVersioning { .. }))
        );
    }

    #[test]
    fn test_rejects_too_few_segments() {
        let (versions, skipped) = accept_versions("", &prefixes(&["v1/"])).unwrap();
        assert!(versions.is_empty());
        assert!(matches!(
            skipped[0],
            SkipReason::IncompatibleVersioning { .. }
        ));
    }

    #[test]
    fn test_rejects_other_parent() {
        let (versions, skipped) = accept_versions("prod", &prefixes(&["prod/churn/v1/"])).unwrap();
        assert!(versions.is_empty());
        assert_eq!(
            skipped,
            vec![SkipReason::NestedDataset {
                dataset_prefix: "prod/churn".to_string()
            }]
        );
    }

    #[test]
    fn test_leading_zeros_and_large_numbers() {
        let (versions, _) = accept_versions(
            "d",
            &prefixes(&["d/v02/", "d/v99999999999999999999999/", "d/v3/"]),
        )
        .unwrap();
        assert_eq!(versions, vec!["v99999999999999999999999", "v3", "v02"]);
    }

    #[tokio::test]
    async fn test_resolve_versions_from_store() {
        let store = InMemoryObjectStore::new("test-bucket")
            .with("prefix/v1/p1", "x", 0)
            .with("prefix/v2/p1", "x", 0)
            .with("prefix/v2/p2", "x", 0)
            .with("prefix/README", "x", 0);

        let (versions, skipped) = resolve_versions(&store, "prefix").await.unwrap();
        assert_eq!(versions, vec!["v2", "v1"]);
        assert!(skipped.is_empty());

        let (versions, _) = resolve_versions(&store, "prefix/").await.unwrap();
        assert_eq!(versions, vec!["v2", "v1"]);
    }

    #[tokio::test]
    async fn test_resolve_versions_ignores_nested_dataset() {
        let store = InMemoryObjectStore::new("test-bucket").with("prod/churn/v1/file", "x", 0);

        let (versions, skipped) = resolve_versions(&store, "prod").await.unwrap();
        assert!(versions.is_empty());
        assert_eq!(
            skipped,
            vec![SkipReason::IncompatibleVersioning {
                candidate: "prod/churn/".to_string()
            }]
        );

        let (versions, _) = resolve_versions(&store, "prod/churn").await.unwrap();
        assert_eq!(versions, vec!["v1"]);
    }

    #[tokio::test]
    async fn test_resolve_versions_missing_prefix() {
        let store = InMemoryObjectStore::new("test-bucket").with("v1/p1", "x", 0);
        assert!(resolve_versions(&store, "v1").await.unwrap().0.is_empty());
    }
}
