//! Parquet footer decoding.
//!
//! This module reads the trailing footer of a Parquet object and exposes its
//! schema as a flat, pre-order list of [`SchemaElement`]s:
//! - `element`: the flattened schema representation
//! - `footer`: range reads of the trailer and footer, and decoding

mod element;
mod footer;
#[cfg(test)]
pub(crate) mod test_files;

pub use element::{ConvertedType, PhysicalType, Repetition, SchemaElement};
#[cfg(test)]
pub(crate) use element::flatten_schema;
pub use footer::{FooterSchema, read_footer_schema};
