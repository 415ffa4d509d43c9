//! File format support

pub mod parquet;
