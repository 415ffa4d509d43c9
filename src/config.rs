//! Configuration constants for the DDL generator
//!
//! This module centralizes the fixed conventions of the object-store layout,
//! the Parquet footer and the generated scripts.

// ============================================================================
// Parquet Footer
// ============================================================================

/// Length of the trailer at the end of every Parquet file: a little-endian
/// `i32` footer length followed by the 4-byte magic number.
pub const FOOTER_TRAILER_LEN: u64 = 8;

pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// Key/value metadata entries that may carry an embedded Avro schema,
/// in lookup order.
pub const AVRO_SCHEMA_KEYS: &[&str] = &["parquet.avro.schema", "avro.schema"];

// ============================================================================
// Dataset Layout
// ============================================================================

/// Marker object written by Hadoop-style jobs once a directory is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Keys matching any of these patterns never take part in schema selection.
///
/// In order: directory markers, temporary directories (a segment starting with
/// an underscore that is not a `key=value` partition), underscore-prefixed
/// files such as `_SUCCESS` or `_metadata`, and `$folder$` markers.
pub const IGNORE_PATTERNS: &[&str] = &[
    r".*/$",
    r".*/_[^=/]*/",
    r".*/_[^/]*$",
    r".*/[^/]*\$folder\$/?$",
];

/// A `name=value` partition directory; every match in a segment names a column
pub const PARTITION_PATTERN: &str = r"([^=/]+)=[^=/]+";

/// Version sub-prefixes look like `v1`, `v2`, ..., `v10`
pub const VERSION_PATTERN: &str = r"^v[0-9]+$";

// ============================================================================
// Object Store
// ============================================================================

/// Page size for `ListObjectsV2` requests (the S3 maximum)
pub const MAX_LISTED_OBJECTS: i32 = 1000;

pub const PATH_DELIMITER: &str = "/";

// ============================================================================
// Output
// ============================================================================

/// Command used to run a statement group through the Hive CLI.
///
/// SQL:2011 reserved keywords are disabled because dataset columns commonly
/// use names such as `timestamp`, `date` or `user`.
pub const HIVE_COMMAND: &[&str] = &[
    "hive",
    "-hiveconf",
    "hive.support.sql11.reserved.keywords=false",
    "-e",
];
