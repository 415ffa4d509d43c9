//! Flattened Parquet schema elements.
//!
//! A Parquet footer stores its schema as a pre-order list of nodes in which
//! every group carries the number of children that follow it. This module
//! defines that flat representation and produces it from the schema tree
//! decoded by the `parquet` crate.

use parquet::basic::{
    ConvertedType as ParquetConvertedType, Repetition as ParquetRepetition,
    Type as ParquetPhysicalType,
};
use parquet::schema::types::Type as ParquetType;

/// Physical storage type of a primitive column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray,
}

impl From<ParquetPhysicalType> for PhysicalType {
    fn from(value: ParquetPhysicalType) -> Self {
        match value {
            ParquetPhysicalType::BOOLEAN => PhysicalType::Boolean,
            ParquetPhysicalType::INT32 => PhysicalType::Int32,
            ParquetPhysicalType::INT64 => PhysicalType::Int64,
            ParquetPhysicalType::INT96 => PhysicalType::Int96,
            ParquetPhysicalType::FLOAT => PhysicalType::Float,
            ParquetPhysicalType::DOUBLE => PhysicalType::Double,
            ParquetPhysicalType::BYTE_ARRAY => PhysicalType::ByteArray,
            ParquetPhysicalType::FIXED_LEN_BYTE_ARRAY => PhysicalType::FixedLenByteArray,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    Required,
    Optional,
    Repeated,
}

impl From<ParquetRepetition> for Repetition {
    fn from(value: ParquetRepetition) -> Self {
        match value {
            ParquetRepetition::REQUIRED => Repetition::Required,
            ParquetRepetition::OPTIONAL => Repetition::Optional,
            ParquetRepetition::REPEATED => Repetition::Repeated,
        }
    }
}

/// Logical annotation layered on a primitive or group node.
///
/// Only the annotations that change the generated SQL type are told apart;
/// everything else (dates, signed/unsigned ints, JSON, ...) is `Other` and
/// maps through the physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertedType {
    Utf8,
    Map,
    MapKeyValue,
    List,
    Decimal,
    Other,
}

impl ConvertedType {
    fn from_parquet(value: ParquetConvertedType) -> Option<Self> {
        match value {
            ParquetConvertedType::NONE => None,
            ParquetConvertedType::UTF8 => Some(ConvertedType::Utf8),
            ParquetConvertedType::MAP => Some(ConvertedType::Map),
            ParquetConvertedType::MAP_KEY_VALUE => Some(ConvertedType::MapKeyValue),
            ParquetConvertedType::LIST => Some(ConvertedType::List),
            ParquetConvertedType::DECIMAL => Some(ConvertedType::Decimal),
            _ => Some(ConvertedType::Other),
        }
    }
}

/// One node of the flattened schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    pub name: String,
    /// `None` for groups
    pub physical_type: Option<PhysicalType>,
    /// `None` only for the schema root
    pub repetition: Option<Repetition>,
    pub converted_type: Option<ConvertedType>,
    pub num_children: Option<i32>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

impl SchemaElement {
    #[cfg(test)]
    pub fn primitive(
        name: &str,
        physical_type: PhysicalType,
        repetition: Repetition,
        converted_type: Option<ConvertedType>,
    ) -> Self {
        Self {
            name: name.to_string(),
            physical_type: Some(physical_type),
            repetition: Some(repetition),
            converted_type,
            num_children: None,
            scale: None,
            precision: None,
        }
    }

    #[cfg(test)]
    pub fn group(
        name: &str,
        repetition: Repetition,
        converted_type: Option<ConvertedType>,
        num_children: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            physical_type: None,
            repetition: Some(repetition),
            converted_type,
            num_children: Some(num_children),
            scale: None,
            precision: None,
        }
    }

    #[cfg(test)]
    /// The schema root: a group without repetition
    pub fn root(name: &str, num_children: i32) -> Self {
        Self {
            repetition: None,
            ..Self::group(name, Repetition::Required, None, num_children)
        }
    }

    #[cfg(test)]
    pub fn with_decimal(mut self, precision: i32, scale: i32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn is_group(&self) -> bool {
        self.physical_type.is_none()
    }
}

/// Flatten a decoded schema tree into pre-order elements with child counts
pub fn flatten_schema(root: &ParquetType) -> Vec<SchemaElement> {
    let mut elements = Vec::new();
    flatten_into(root, &mut elements);
    elements
}

fn flatten_into(node: &ParquetType, elements: &mut Vec<SchemaElement>) {
    let info = node.get_basic_info();
    let repetition = info.has_repetition().then(|| info.repetition().into());

    // Writers that only set the newer logical type still imply a converted type
    let converted_type = match info.converted_type() {
        ParquetConvertedType::NONE => ConvertedType::from_parquet(info.logical_type().into()),
        converted => ConvertedType::from_parquet(converted),
    };

    match node {
        ParquetType::PrimitiveType {
            physical_type,
            scale,
            precision,
            ..
        } => elements.push(SchemaElement {
            name: info.name().to_string(),
            physical_type: Some((*physical_type).into()),
            repetition,
            converted_type,
            num_children: None,
            scale: (*scale >= 0).then_some(*scale),
            precision: (*precision >= 0).then_some(*precision),
        }),
        ParquetType::GroupType { fields, .. } => {
            elements.push(SchemaElement {
                name: info.name().to_string(),
                physical_type: None,
                repetition,
                converted_type,
                num_children: Some(fields.len() as i32),
                scale: None,
                precision: None,
            });
            for field in fields {
                flatten_into(field, elements);
            }
        }
    }
}
