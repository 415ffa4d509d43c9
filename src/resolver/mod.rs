//! Dataset and version resolution.
//!
//! A dataset lives under `<root>/v<N>/[<key>=<value>/...]<file>`. The resolver
//! finds the version sub-prefixes of a root, picks one representative object
//! per version and turns the result into a plan of tables to compile.

mod plan;
mod representative;
mod versions;

pub use plan::{CompileRequest, DatasetOptions, DatasetOptionsBuilder, plan};
pub use representative::SuccessMarkerCache;

/// Why a version (or a whole dataset) contributes no tables
///
/// These are diagnostics, not errors: the unit is left out and the run goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyDataset,
    MissingSuccessMarker,
    IncompatibleVersioning { candidate: String },
    NestedDataset { dataset_prefix: String },
    VersionNotFound { version: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyDataset => write!(f, "Ignoring empty dataset"),
            SkipReason::MissingSuccessMarker => {
                write!(f, "Ignoring dataset missing _SUCCESS file")
            }
            SkipReason::IncompatibleVersioning { candidate } => write!(
                f,
                "Ignoring incompatible versioning scheme at {}: version must be an integer prefixed with a 'v'",
                candidate
            ),
            SkipReason::NestedDataset { dataset_prefix } => write!(
                f,
                "Ignoring dataset nested within prefix. To load this dataset, run on it directly: {}",
                dataset_prefix
            ),
            SkipReason::VersionNotFound { version } => {
                write!(f, "No schemas available with that version ({})", version)
            }
        }
    }
}
