//! Table DDL assembly and rendering.

use anyhow::{Result, anyhow};
use std::collections::HashSet;

use crate::config::HIVE_COMMAND;
use crate::error::CompileError;

use super::field::Field;
use super::sql_type::sql_type;

/// One top-level column declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
}

/// The drop / create / repair statements for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDdl {
    pub table_name: String,
    sql: String,
}

impl TableDdl {
    /// The statements as one line of SQL
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// A shell command line that runs the statements through the Hive CLI
    pub fn to_hive_command(&self) -> Result<String> {
        let words = HIVE_COMMAND.iter().copied().chain(std::iter::once(self.sql()));
        shlex::try_join(words)
            .map_err(|e| anyhow!("Cannot quote DDL for {}: {}", self.table_name, e))
    }
}

/// Compile decoded Parquet columns into table DDL
pub fn compile(
    fields: &[Field],
    table_name: &str,
    location: &str,
    partitions: &[String],
) -> Result<TableDdl, CompileError> {
    let columns = fields
        .iter()
        .map(|field| {
            Ok(Column {
                name: field.name.clone(),
                sql_type: sql_type(field)?,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;

    compile_columns(&columns, table_name, location, partitions)
}

/// Compile already-typed columns into table DDL
pub fn compile_columns(
    columns: &[Column],
    table_name: &str,
    location: &str,
    partitions: &[String],
) -> Result<TableDdl, CompileError> {
    let column_names: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let duplicates: Vec<String> = partitions
        .iter()
        .filter(|p| column_names.contains(p.as_str()))
        .cloned()
        .collect();
    if !duplicates.is_empty() {
        return Err(CompileError::Configuration(duplicates));
    }

    let columns_decl = columns
        .iter()
        .map(|c| format!("`{}` {}", c.name, c.sql_type))
        .collect::<Vec<_>>()
        .join(", ");

    let partition_decl = if partitions.is_empty() {
        String::new()
    } else {
        let partition_columns = partitions
            .iter()
            .map(|p| format!("`{}` string", p))
            .collect::<Vec<_>>()
            .join(", ");
        format!(" partitioned by ({})", partition_columns)
    };

    let sql = format!(
        "drop table if exists {table}; \
         create external table {table}({columns}){partitions} stored as parquet location '{location}'; \
         msck repair table {table};",
        table = table_name,
        columns = columns_decl,
        partitions = partition_decl,
        location = location,
    );

    Ok(TableDdl {
        table_name: table_name.to_string(),
        sql,
    })
}
