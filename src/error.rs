//! Error taxonomy for schema decoding and DDL compilation
//!
//! These errors are fatal to one dataset only. The runner catches them at the
//! dataset boundary, reports them and moves on to the next dataset. I/O and
//! object-store failures travel as `anyhow::Error` like everywhere else.

use thiserror::Error;

/// The object is not a readable Parquet file, or its schema is malformed
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file is too small")]
    TooSmall,

    #[error("magic number is invalid")]
    BadMagic,

    #[error("malformed schema: {0}")]
    MalformedSchema(String),

    #[error("failed to decode footer: {0}")]
    Decode(#[from] parquet::errors::ParquetError),

    #[error("no embedded Avro schema found in footer metadata")]
    MissingAvroSchema,

    #[error("invalid embedded Avro schema: {0}")]
    InvalidAvroSchema(#[from] serde_json::Error),
}

/// A schema could not be turned into a table definition
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Unknown type {type_name} for field `{field}`")]
    UnknownType { field: String, type_name: String },

    #[error(
        "Columns {} are in both the table columns and the partitioning columns; they should only be in one or another",
        .0.join(", ")
    )]
    Configuration(Vec<String>),
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CompileError::Format(FormatError::MalformedSchema(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_columns() {
        let err = CompileError::Configuration(vec!["id".to_string(), "day".to_string()]);
        assert_eq!(
            err.to_string(),
            "Columns id, day are in both the table columns and the partitioning columns; they should only be in one or another"
        );
    }

    #[test]
    fn test_format_error_messages() {
        assert_eq!(FormatError::TooSmall.to_string(), "file is too small");
        assert_eq!(FormatError::BadMagic.to_string(), "magic number is invalid");
        assert!(matches!(
            CompileError::malformed("truncated"),
            CompileError::Format(FormatError::MalformedSchema(_))
        ));
    }
}
