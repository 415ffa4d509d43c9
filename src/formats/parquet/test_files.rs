//! Real Parquet files for tests, written with the `parquet` crate

use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use std::sync::Arc;

/// A valid Parquet file with the given message schema and no row groups
pub fn schema_only_file(message: &str) -> Vec<u8> {
    schema_only_file_with_metadata(message, &[])
}

/// Like [`schema_only_file`], with key/value metadata in the footer
pub fn schema_only_file_with_metadata(message: &str, metadata: &[(&str, &str)]) -> Vec<u8> {
    let schema = Arc::new(parse_message_type(message).unwrap());

    let key_value_metadata = (!metadata.is_empty()).then(|| {
        metadata
            .iter()
            .map(|(key, value)| KeyValue::new(key.to_string(), value.to_string()))
            .collect()
    });
    let props = Arc::new(
        WriterProperties::builder()
            .set_key_value_metadata(key_value_metadata)
            .build(),
    );

    let mut buffer = Vec::new();
    let writer = SerializedFileWriter::new(&mut buffer, schema, props).unwrap();
    writer.close().unwrap();
    buffer
}
