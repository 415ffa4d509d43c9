use anyhow::Result;
use derive_builder::Builder;
use tracing::{info, warn};

use crate::ddl::{normalize_table_name, versioned_table_name};
use crate::io::{ObjectStore, dir_prefix, join_key};

use super::SkipReason;
use super::representative::{
    IgnoreRules, Selection, SuccessMarkerCache, partition_fields, select_representative,
};
use super::versions::resolve_versions;

/// Per-dataset selection options
#[derive(Debug, Clone, Default, Builder)]
#[builder(default)]
pub struct DatasetOptions {
    /// Only use objects whose directory holds a success marker
    pub success_only: bool,
    /// Load at most this many versions, newest first
    #[builder(setter(strip_option))]
    pub recent_versions: Option<usize>,
    /// Load only this version
    #[builder(setter(into, strip_option))]
    pub version: Option<String>,
    /// Table name to use instead of the dataset's last path segment
    #[builder(setter(into, strip_option))]
    pub alias: Option<String>,
    /// Extra key patterns to leave out, matched from the start of the key
    pub exclude_patterns: Vec<String>,
}

/// One table to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub table_name: String,
    pub version: String,
    /// Key of the representative object whose footer defines the schema
    pub object_key: String,
    pub location: String,
    pub partitions: Vec<String>,
}

/// Tables to compile for one dataset, in output order
#[derive(Debug, Clone, Default)]
pub struct DatasetPlan {
    pub requests: Vec<CompileRequest>,
    pub skipped: Vec<(Option<String>, SkipReason)>,
}

/// Resolve the dataset rooted at `dataset_prefix` into compile requests
///
/// Versions are visited newest first. The first version that loads is
/// requested twice: once as `<name>_vN` and right after as the unversioned
/// `<name>`.
pub async fn plan(
    store: &dyn ObjectStore,
    dataset_prefix: &str,
    options: &DatasetOptions,
    markers: &mut SuccessMarkerCache,
) -> Result<DatasetPlan> {
    let rules = IgnoreRules::new(&options.exclude_patterns)?;
    let mut result = DatasetPlan::default();

    let (mut versions, rejected) = resolve_versions(store, dataset_prefix).await?;
    for reason in rejected {
        result.skip(None, reason);
    }
    if let Some(pinned) = &options.version {
        versions.retain(|v| v == pinned);
        if versions.is_empty() {
            result.skip(
                None,
                SkipReason::VersionNotFound {
                    version: pinned.clone(),
                },
            );
        }
    }

    let dataset_name = match &options.alias {
        Some(alias) => alias.clone(),
        None => dataset_name(dataset_prefix),
    };

    let mut versions_loaded = 0;
    for version in versions {
        let version_prefix = dir_prefix(&join_key(dataset_prefix, &version));

        let object = match select_representative(
            store,
            &version_prefix,
            &rules,
            options.success_only,
            markers,
        )
        .await?
        {
            Selection::Found(object) => object,
            Selection::Empty => {
                result.skip(Some(version), SkipReason::EmptyDataset);
                continue;
            }
            Selection::MissingSuccessMarker => {
                result.skip(Some(version), SkipReason::MissingSuccessMarker);
                continue;
            }
        };

        info!("Analyzing dataset {}, {}", dataset_name, version);

        let suffix = object.key.strip_prefix(&version_prefix).unwrap_or(&object.key);
        let request = CompileRequest {
            table_name: versioned_table_name(&dataset_name, &version),
            location: store.location(&join_key(dataset_prefix, &version)),
            partitions: partition_fields(suffix)?,
            object_key: object.key.clone(),
            version,
        };

        let alias = (versions_loaded == 0).then(|| CompileRequest {
            table_name: normalize_table_name(&dataset_name),
            ..request.clone()
        });
        result.requests.push(request);
        result.requests.extend(alias);

        versions_loaded += 1;
        if options.recent_versions.is_some_and(|n| versions_loaded >= n) {
            break;
        }
    }

    Ok(result)
}

impl DatasetPlan {
    fn skip(&mut self, version: Option<String>, reason: SkipReason) {
        match &version {
            Some(version) => warn!("{} ({})", reason, version),
            None => warn!("{}", reason),
        }
        self.skipped.push((version, reason));
    }
}

/// Last path segment of a dataset prefix
fn dataset_name(dataset_prefix: &str) -> String {
    dataset_prefix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
