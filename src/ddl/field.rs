//! Schema tree reconstruction.

use crate::error::CompileError;
use crate::formats::parquet::{ConvertedType, PhysicalType, Repetition, SchemaElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Group(Vec<Field>),
    Primitive(PhysicalType),
}

/// One node of the rebuilt schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub repetition: Repetition,
    pub converted_type: Option<ConvertedType>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

impl Field {
    #[cfg(test)]
    pub fn primitive(name: &str, physical_type: PhysicalType, repetition: Repetition) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Primitive(physical_type),
            repetition,
            converted_type: None,
            scale: None,
            precision: None,
        }
    }

    #[cfg(test)]
    pub fn group(name: &str, repetition: Repetition, children: Vec<Field>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Group(children),
            repetition,
            converted_type: None,
            scale: None,
            precision: None,
        }
    }

    #[cfg(test)]
    pub fn with_converted_type(mut self, converted_type: ConvertedType) -> Self {
        self.converted_type = Some(converted_type);
        self
    }

    pub fn children(&self) -> &[Field] {
        match &self.kind {
            FieldKind::Group(children) => children,
            FieldKind::Primitive(_) => &[],
        }
    }
}

/// Rebuild `child_count` sibling trees from pre-order elements
///
/// `cursor` is shared by every level of the recursion and ends one past the
/// last element consumed.
pub fn build_tree(
    elements: &[SchemaElement],
    cursor: &mut usize,
    child_count: usize,
) -> Result<Vec<Field>, CompileError> {
    let mut fields = Vec::with_capacity(child_count);

    for _ in 0..child_count {
        let element = elements.get(*cursor).ok_or_else(|| {
            CompileError::malformed(format!(
                "schema ended after {} elements while more children were expected",
                elements.len()
            ))
        })?;
        *cursor += 1;

        let kind = match element.physical_type {
            Some(physical_type) => FieldKind::Primitive(physical_type),
            None => {
                let count = element.num_children.unwrap_or(0);
                let count = usize::try_from(count).map_err(|_| {
                    CompileError::malformed(format!(
                        "group `{}` has a negative child count {}",
                        element.name, count
                    ))
                })?;
                FieldKind::Group(build_tree(elements, cursor, count)?)
            }
        };

        fields.push(Field {
            name: element.name.clone(),
            kind,
            repetition: element.repetition.unwrap_or(Repetition::Optional),
            converted_type: element.converted_type,
            scale: element.scale,
            precision: element.precision,
        });
    }

    Ok(fields)
}

/// Rebuild the top-level columns from a complete flattened schema
pub fn decode_schema(elements: &[SchemaElement]) -> Result<Vec<Field>, CompileError> {
    let root = elements
        .first()
        .ok_or_else(|| CompileError::malformed("schema has no root element"))?;
    if !root.is_group() {
        return Err(CompileError::malformed(format!(
            "schema root `{}` is not a group",
            root.name
        )));
    }

    let child_count = usize::try_from(root.num_children.unwrap_or(0))
        .map_err(|_| CompileError::malformed("schema root has a negative child count"))?;

    let mut cursor = 1;
    let fields = build_tree(elements, &mut cursor, child_count)?;

    if cursor != elements.len() {
        return Err(CompileError::malformed(format!(
            "schema has {} trailing elements after the root's children",
            elements.len() - cursor
        )));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::formats::parquet::flatten_schema;
    use parquet::schema::parser::parse_message_type;

    use ConvertedType::*;
    use PhysicalType::*;
    use Repetition::*;

    #[test]
    fn test_build_tree_flat_columns() {
        let elements = vec![
            SchemaElement::root("spark_schema", 3),
            SchemaElement::primitive("clientId", ByteArray, Optional, Some(Utf8)),
            SchemaElement::primitive("sampleId", Int32, Optional, None),
            SchemaElement::primitive("someDecimal", FixedLenByteArray, Optional, Some(Decimal))
                .with_decimal(4, 2),
        ];

        let fields = decode_schema(&elements).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields[0],
            Field::primitive("clientId", ByteArray, Optional).with_converted_type(Utf8)
        );
        assert_eq!(fields[2].precision, Some(4));
        assert_eq!(fields[2].scale, Some(2));
    }

    #[test]
    fn test_build_tree_nested_groups_share_cursor() {
        let elements = vec![
            SchemaElement::root("schema", 2),
            SchemaElement::group("outer", Optional, None, 2),
            SchemaElement::group("inner", Required, None, 1),
            SchemaElement::primitive("leaf", Int64, Required, None),
            SchemaElement::primitive("after_inner", Boolean, Optional, None),
            SchemaElement::primitive("last", Double, Optional, None),
        ];

        let fields = decode_schema(&elements).unwrap();

        let expected = vec![
            Field::group(
                "outer",
                Optional,
                vec![
                    Field::group(
                        "inner",
                        Required,
                        vec![Field::primitive("leaf", Int64, Required)],
                    ),
                    Field::primitive("after_inner", Boolean, Optional),
                ],
            ),
            Field::primitive("last", Double, Optional),
        ];
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_build_tree_inverts_flattening() {
        let schema = parse_message_type(
            "message schema {
                optional group m (MAP) {
                    repeated group key_value {
                        required binary key (UTF8);
                        optional group value {
                            optional int32 a;
                            optional group b (LIST) {
                                repeated int64 array;
                            }
                        }
                    }
                }
                repeated int32 num;
            }",
        )
        .unwrap();

        let elements = flatten_schema(&schema);
        let fields = decode_schema(&elements).unwrap();

        let value = Field::group(
            "value",
            Optional,
            vec![
                Field::primitive("a", Int32, Optional),
                Field::group(
                    "b",
                    Optional,
                    vec![Field::primitive("array", Int64, Repeated)],
                )
                .with_converted_type(List),
            ],
        );
        let expected = vec![
            Field::group(
                "m",
                Optional,
                vec![Field::group(
                    "key_value",
                    Repeated,
                    vec![
                        Field::primitive("key", ByteArray, Required).with_converted_type(Utf8),
                        value,
                    ],
                )],
            )
            .with_converted_type(Map),
            Field::primitive("num", Int32, Repeated),
        ];
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_truncated_schema_is_format_error() {
        let elements = vec![
            SchemaElement::root("schema", 2),
            SchemaElement::group("outer", Optional, None, 2),
            SchemaElement::primitive("only_child", Int32, Optional, None),
        ];

        let err = decode_schema(&elements).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Format(FormatError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_trailing_elements_are_format_error() {
        let elements = vec![
            SchemaElement::root("schema", 1),
            SchemaElement::primitive("id", Int64, Optional, None),
            SchemaElement::primitive("stray", Int64, Optional, None),
        ];

        assert!(decode_schema(&elements).is_err());
    }

    #[test]
    fn test_root_must_be_group() {
        let elements = vec![SchemaElement::primitive("id", Int64, Optional, None)];
        assert!(decode_schema(&elements).is_err());
        assert!(decode_schema(&[]).is_err());
    }

    #[test]
    fn test_empty_root_has_no_columns() {
        let elements = vec![SchemaElement::root("schema", 0)];
        assert!(decode_schema(&elements).unwrap().is_empty());
    }
}
