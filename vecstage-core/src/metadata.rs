//! Fitting staged rows to vector index metadata constraints.
//!
//! Index metadata accepts strings, numbers, booleans and lists of strings.
//! Nulls are rejected, so they are blanked to `""`.

use std::collections::HashMap;

use crate::{is_embedding_column, StagedRecord, Value};

/// Redundant text columns: copies of `page_content`, `technical_summary`
/// and `entities_list` that would double the metadata payload.
pub const DEFAULT_DROPPED_COLUMNS: &[&str] = &["content", "primary_content", "entities"];

/// Per-vector metadata ceiling enforced by Pinecone.
pub const METADATA_BYTE_LIMIT: usize = 40_960;

pub fn default_dropped_columns() -> Vec<String> {
    DEFAULT_DROPPED_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .collect()
}

/// Strips embeddings, the `id` key and `drop_columns`, and fits every
/// remaining value.
pub fn clean_metadata(record: &StagedRecord, drop_columns: &[String]) -> HashMap<String, Value> {
    record
        .fields
        .iter()
        .filter(|(column, _)| {
            column.as_str() != "id"
                && !is_embedding_column(column)
                && !drop_columns.iter().any(|drop| drop == *column)
        })
        .map(|(column, value)| (column.clone(), fit_value(value.clone())))
        .collect()
}

pub fn fit_value(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Number(number) => match number.as_f64() {
            Some(v) if v.is_finite() => Value::Number(number),
            _ => Value::String(String::new()),
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(s),
                    Value::Null => Value::String(String::new()),
                    other => Value::String(other.to_string()),
                })
                .collect(),
        ),
        Value::Object(map) => Value::String(Value::Object(map).to_string()),
        other => other,
    }
}

pub fn metadata_size(metadata: &HashMap<String, Value>) -> usize {
    serde_json::to_vec(metadata)
        .map(|bytes| bytes.len())
        .unwrap_or(0)
}
