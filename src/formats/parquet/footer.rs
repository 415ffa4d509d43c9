//! Parquet footer reader.

use anyhow::{Context, Result};
use parquet::file::metadata::ParquetMetaDataReader;
use tracing::debug;

use crate::config::{AVRO_SCHEMA_KEYS, FOOTER_TRAILER_LEN, PARQUET_MAGIC};
use crate::error::FormatError;
use crate::io::ByteReader;

use super::element::{SchemaElement, flatten_schema};

/// Everything the compilers need from one file's footer
#[derive(Debug, Clone)]
pub struct FooterSchema {
    /// Flattened schema, root element first
    pub elements: Vec<SchemaElement>,
    /// Avro schema JSON embedded by the writer, if any
    pub avro_schema: Option<String>,
}

/// Read and decode the footer of the object behind `reader`
///
/// Only the trailer and the footer itself are fetched, never the column data.
pub async fn read_footer_schema(reader: &dyn ByteReader) -> Result<FooterSchema> {
    let size = reader.size().await.context("Failed to get object size")?;
    if size < FOOTER_TRAILER_LEN {
        return Err(FormatError::TooSmall.into());
    }

    let trailer = reader
        .read_range(size - FOOTER_TRAILER_LEN, size)
        .await
        .context("Failed to read footer trailer")?;
    let (footer_len, magic) = parse_trailer(&trailer)?;

    if size < FOOTER_TRAILER_LEN + footer_len {
        return Err(FormatError::TooSmall.into());
    }
    if magic != PARQUET_MAGIC {
        return Err(FormatError::BadMagic.into());
    }

    let footer_start = size - FOOTER_TRAILER_LEN - footer_len;
    let footer = reader
        .read_range(footer_start, size - FOOTER_TRAILER_LEN)
        .await
        .context("Failed to read footer")?;
    debug!("Read {} byte footer", footer.len());

    decode_footer(&footer).map_err(Into::into)
}

fn parse_trailer(trailer: &[u8]) -> Result<(u64, &[u8]), FormatError> {
    if trailer.len() as u64 != FOOTER_TRAILER_LEN {
        return Err(FormatError::TooSmall);
    }
    let (len_bytes, magic) = trailer.split_at(4);
    let len_bytes: [u8; 4] = len_bytes.try_into().map_err(|_| FormatError::TooSmall)?;

    let footer_len = i32::from_le_bytes(len_bytes);
    if footer_len < 0 {
        return Err(FormatError::MalformedSchema(format!(
            "negative footer length {}",
            footer_len
        )));
    }

    Ok((footer_len as u64, magic))
}

fn decode_footer(footer: &[u8]) -> Result<FooterSchema, FormatError> {
    let metadata = ParquetMetaDataReader::decode_metadata(footer)?;
    let file_metadata = metadata.file_metadata();

    let elements = flatten_schema(file_metadata.schema());

    let avro_schema = file_metadata.key_value_metadata().and_then(|entries| {
        AVRO_SCHEMA_KEYS
            .iter()
            .find_map(|wanted| {
                entries
                    .iter()
                    .find(|kv| kv.key == *wanted)
                    .and_then(|kv| kv.value.clone())
            })
            .or_else(|| entries.first().and_then(|kv| kv.value.clone()))
    });

    Ok(FooterSchema {
        elements,
        avro_schema,
    })
}
