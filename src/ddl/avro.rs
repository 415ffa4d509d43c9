//! Columns from an Avro schema embedded in the footer metadata.
//!
//! Writers that go through parquet-avro (and older Spark versions) store the
//! schema they were given as JSON in the key/value metadata. This path
//! compiles that JSON directly instead of the Parquet schema elements.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{CompileError, FormatError};

use super::statement::Column;

#[derive(Debug, Deserialize)]
struct AvroRecord {
    fields: Vec<AvroField>,
}

#[derive(Debug, Deserialize)]
struct AvroField {
    name: String,
    #[serde(rename = "type")]
    field_type: Value,
}

/// Named record types seen so far in one schema
///
/// A record may be declared once and referenced by name afterwards. Each
/// top-level compile starts from an empty registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &str, sql_type: &str) {
        self.types.insert(name.to_string(), sql_type.to_string());
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }
}

/// Top-level columns of an Avro record schema
pub fn avro_columns(schema_json: &str) -> Result<Vec<Column>, CompileError> {
    let record: AvroRecord =
        serde_json::from_str(schema_json).map_err(FormatError::InvalidAvroSchema)?;

    let mut registry = TypeRegistry::new();
    record
        .fields
        .iter()
        .map(|field| {
            Ok(Column {
                name: field.name.clone(),
                sql_type: avro_type(&field.name, &field.field_type, &mut registry)?,
            })
        })
        .collect()
}

/// Hive type expression for one Avro type
pub fn avro_type(
    field: &str,
    avro: &Value,
    registry: &mut TypeRegistry,
) -> Result<String, CompileError> {
    match avro {
        Value::String(name) => match name.as_str() {
            "string" | "int" | "float" | "double" | "boolean" | "date" | "timestamp"
            | "binary" => Ok(name.clone()),
            "integer" => Ok("int".to_string()),
            "long" => Ok("bigint".to_string()),
            other => registry
                .lookup(other)
                .map(str::to_string)
                .ok_or_else(|| unknown(field, avro)),
        },
        Value::Object(object) => match object.get("type") {
            Some(Value::String(kind)) if kind == "map" => {
                let values = object
                    .get("values")
                    .or_else(|| object.get("valueType"))
                    .ok_or_else(|| unknown(field, avro))?;
                Ok(format!("map<string,{}>", avro_type(field, values, registry)?))
            }
            Some(Value::String(kind)) if kind == "array" => {
                let items = object
                    .get("items")
                    .or_else(|| object.get("elementType"))
                    .ok_or_else(|| unknown(field, avro))?;
                Ok(format!("array<{}>", avro_type(field, items, registry)?))
            }
            Some(Value::String(kind)) if kind == "record" || kind == "struct" => {
                let sql_type = struct_type(object.get("fields"), registry)?;
                if kind == "record" {
                    if let Some(Value::String(name)) = object.get("name") {
                        registry.register(name, &sql_type);
                    }
                }
                Ok(sql_type)
            }
            // {"type": "string"} and similar wrappers
            Some(inner) => avro_type(field, inner, registry),
            None => Err(unknown(field, avro)),
        },
        Value::Array(branches) => match branches.as_slice() {
            // Only the first two branches are looked at
            [first, second, ..] if second == "null" => avro_type(field, first, registry),
            [_, second, ..] => avro_type(field, second, registry),
            _ => Err(unknown(field, avro)),
        },
        _ => Err(unknown(field, avro)),
    }
}

fn struct_type(fields: Option<&Value>, registry: &mut TypeRegistry) -> Result<String, CompileError> {
    let fields: Vec<AvroField> = match fields {
        Some(fields) => {
            serde_json::from_value(fields.clone()).map_err(FormatError::InvalidAvroSchema)?
        }
        None => return Err(CompileError::malformed("record has no fields")),
    };

    let members = fields
        .iter()
        .map(|f| Ok(format!("`{}`: {}", f.name, avro_type(&f.name, &f.field_type, registry)?)))
        .collect::<Result<Vec<_>, CompileError>>()?;

    Ok(format!("struct<{}>", members.join(", ")))
}

fn unknown(field: &str, avro: &Value) -> CompileError {
    CompileError::UnknownType {
        field: field.to_string(),
        type_name: avro.to_string(),
    }
}
