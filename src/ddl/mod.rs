//! Schema decoding and Hive DDL compilation.
//!
//! - `field`: rebuilds the schema tree from the flattened footer elements
//! - `sql_type`: maps a field to its Hive type expression
//! - `avro`: the same for an embedded Avro schema
//! - `statement`: assembles and renders the drop/create/repair statements
//! - `naming`: table name normalization

mod avro;
mod field;
mod naming;
mod sql_type;
mod statement;

pub use naming::{normalize_table_name, versioned_table_name};

use avro::avro_columns;
use field::decode_schema;
use statement::{TableDdl, compile, compile_columns};

use crate::error::{CompileError, FormatError};
use crate::formats::parquet::FooterSchema;

/// Which schema in the footer the columns are compiled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaSource {
    /// The Parquet schema elements
    #[default]
    Parquet,
    /// An Avro schema embedded in the key/value metadata
    Avro,
}

impl SchemaSource {
    /// Parse a schema source from string (case-insensitive)
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(SchemaSource::Parquet),
            "avro" => Ok(SchemaSource::Avro),
            _ => Err(anyhow::anyhow!(
                "Unsupported schema source: {}. Supported sources: parquet, avro",
                s
            )),
        }
    }
}

/// Compile one footer into the DDL of one table
pub fn compile_footer(
    footer: &FooterSchema,
    source: SchemaSource,
    table_name: &str,
    location: &str,
    partitions: &[String],
) -> Result<TableDdl, CompileError> {
    match source {
        SchemaSource::Parquet => {
            let fields = decode_schema(&footer.elements)?;
            compile(&fields, table_name, location, partitions)
        }
        SchemaSource::Avro => {
            let schema = footer
                .avro_schema
                .as_deref()
                .ok_or(FormatError::MissingAvroSchema)?;
            let columns = avro_columns(schema)?;
            compile_columns(&columns, table_name, location, partitions)
        }
    }
}
