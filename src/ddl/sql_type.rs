//! Parquet field to Hive SQL type resolution.
//!
//! Lists and maps have been written in several shapes over the years. The
//! rules below are tried in order and the first match wins, so the order of
//! the match arms in [`resolve`] matters: a repeated group that carries list
//! or map semantics must reach its dedicated arm before the generic
//! "repeated means array" arm.

use crate::error::CompileError;
use crate::formats::parquet::{ConvertedType, PhysicalType, Repetition};

use super::field::{Field, FieldKind};

/// Hive type expression for a field, using the field's own repetition
pub fn sql_type(field: &Field) -> Result<String, CompileError> {
    resolve(field, field.repetition)
}

/// Resolve `field` as if it had `repetition`
///
/// The override only lives for this call; the field itself is never changed.
fn resolve(field: &Field, repetition: Repetition) -> Result<String, CompileError> {
    use ConvertedType::*;

    match (&field.kind, field.converted_type, repetition) {
        (FieldKind::Group(children), Some(List), _) => list_type(field, children),
        (FieldKind::Group(children), Some(Map | MapKeyValue), _) => map_type(field, children),
        (FieldKind::Group(children), None, _) => struct_type(children),
        (_, _, Repetition::Repeated) => {
            Ok(format!("array<{}>", resolve(field, Repetition::Required)?))
        }
        (FieldKind::Primitive(PhysicalType::ByteArray), Some(Utf8), _) => Ok("string".to_string()),
        (FieldKind::Primitive(PhysicalType::FixedLenByteArray), Some(Decimal), _) => {
            decimal_type(field)
        }
        (FieldKind::Primitive(physical_type), _, _) => {
            Ok(primitive_type(*physical_type).to_string())
        }
        (FieldKind::Group(_), Some(_), _) => Err(CompileError::UnknownType {
            field: field.name.clone(),
            type_name: "annotated group".to_string(),
        }),
    }
}

fn primitive_type(physical_type: PhysicalType) -> &'static str {
    match physical_type {
        PhysicalType::Boolean => "boolean",
        PhysicalType::Int32 => "int",
        PhysicalType::Int64 => "bigint",
        PhysicalType::Int96 => "timestamp",
        PhysicalType::Float => "float",
        PhysicalType::Double => "double",
        PhysicalType::ByteArray => "binary",
        PhysicalType::FixedLenByteArray => "binary",
    }
}

/// `array<T>` for a LIST-annotated group
///
/// The single repeated child is either the element itself (legacy two-level
/// lists) or a wrapper around the element (three-level lists). A child that
/// is a primitive, has several fields, or is named `array` / `<list>_tuple`
/// is the element.
fn list_type(field: &Field, children: &[Field]) -> Result<String, CompileError> {
    let [repeated] = children else {
        return Err(CompileError::malformed(format!(
            "list `{}` must have exactly one child, found {}",
            field.name,
            children.len()
        )));
    };

    let element_type = match &repeated.kind {
        FieldKind::Primitive(_) => resolve(repeated, Repetition::Required)?,
        FieldKind::Group(grandchildren)
            if grandchildren.len() > 1
                || repeated.name == "array"
                || repeated.name == format!("{}_tuple", field.name) =>
        {
            resolve(repeated, Repetition::Required)?
        }
        FieldKind::Group(grandchildren) => match grandchildren.as_slice() {
            [element] => sql_type(element)?,
            _ => {
                return Err(CompileError::malformed(format!(
                    "list `{}` has an empty element group `{}`",
                    field.name, repeated.name
                )));
            }
        },
    };

    Ok(format!("array<{}>", element_type))
}

/// `map<K,V>` from the repeated key/value group of a MAP-annotated group
fn map_type(field: &Field, children: &[Field]) -> Result<String, CompileError> {
    let key_value = match children {
        [key_value] => key_value.children(),
        _ => &[],
    };

    match key_value {
        [key, value] => Ok(format!("map<{},{}>", sql_type(key)?, sql_type(value)?)),
        _ => Err(CompileError::malformed(format!(
            "map `{}` must hold one repeated group with a key and a value",
            field.name
        ))),
    }
}

fn struct_type(children: &[Field]) -> Result<String, CompileError> {
    let members = children
        .iter()
        .map(|child| Ok(format!("`{}`: {}", child.name, sql_type(child)?)))
        .collect::<Result<Vec<_>, CompileError>>()?;

    Ok(format!("struct<{}>", members.join(", ")))
}

fn decimal_type(field: &Field) -> Result<String, CompileError> {
    match (field.precision, field.scale) {
        (Some(precision), Some(scale)) => Ok(format!("decimal({},{})", precision, scale)),
        _ => Err(CompileError::malformed(format!(
            "decimal `{}` is missing its precision or scale",
            field.name
        ))),
    }
}
