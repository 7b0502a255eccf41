use std::collections::HashMap;

use vecstage_core::metadata::clean_metadata;
use vecstage_core::{is_embedding_column, StagedRecord, Value};

use crate::StagingError;

/// Rows of a staging file indexed by `id`.
#[derive(Clone, Debug, Default)]
pub struct StagedFrame {
    columns: Vec<String>,
    records: Vec<StagedRecord>,
    positions: HashMap<String, usize>,
}

impl StagedFrame {
    /// Fails on the first repeated id.
    pub fn from_records(
        columns: Vec<String>,
        records: Vec<StagedRecord>,
    ) -> Result<Self, StagingError> {
        let mut positions = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(StagingError::NullId { row });
            }
            if positions.insert(record.id.clone(), row).is_some() {
                return Err(StagingError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            columns,
            records,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source columns in file order, `id` excluded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn embedding_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|column| is_embedding_column(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn records(&self) -> &[StagedRecord] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&StagedRecord> {
        self.positions.get(id).map(|&row| &self.records[row])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataRow {
    pub id: String,
    pub metadata: HashMap<String, Value>,
}

/// Metadata-only view of a frame: embeddings and `drop_columns` removed,
/// nulls blanked.
pub fn clean_metadata_for_vector_store(
    frame: &StagedFrame,
    drop_columns: &[String],
) -> Vec<MetadataRow> {
    frame
        .records()
        .iter()
        .map(|record| MetadataRow {
            id: record.id.clone(),
            metadata: clean_metadata(record, drop_columns),
        })
        .collect()
}
