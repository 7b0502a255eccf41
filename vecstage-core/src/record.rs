use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{CoreError, Value};

/// Column used when a row has no value in the requested embedding column.
pub const PAGE_CONTENT_EMBEDDING: &str = "page_content_embedding";
pub const EMBEDDING_SUFFIX: &str = "_embedding";

pub fn is_embedding_column(name: &str) -> bool {
    name.ends_with(EMBEDDING_SUFFIX)
}

/// One row of a staging file, keyed by its `id` column.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StagedRecord {
    pub id: String,
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEmbedding {
    pub values: Vec<f32>,
    pub column: String,
    pub fell_back: bool,
}

impl StagedRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, column: impl Into<String>, value: Value) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Decodes an embedding cell. Staging files store vectors either as
    /// JSON-encoded strings or as native float lists; both decode here.
    /// Nulls, blank strings and the literal `null` yield `None`.
    pub fn embedding(&self, column: &str) -> Result<Option<Vec<f32>>, CoreError> {
        let malformed = |reason: String| CoreError::MalformedEmbedding {
            id: self.id.clone(),
            column: column.to_string(),
            reason,
        };

        match self.fields.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => {
                if raw.trim().is_empty() {
                    return Ok(None);
                }
                let parsed: Option<Vec<f32>> =
                    serde_json::from_str(raw).map_err(|err| malformed(err.to_string()))?;
                Ok(parsed)
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_f64()
                        .map(|v| v as f32)
                        .ok_or_else(|| malformed(format!("non-numeric element {item}")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(malformed(format!("unexpected value {other}"))),
        }
    }

    /// Picks the vector to upload: `column` when present, otherwise the
    /// page content embedding.
    pub fn resolve_embedding(&self, column: &str) -> Result<ResolvedEmbedding, CoreError> {
        if let Some(values) = self.embedding(column)? {
            return Ok(ResolvedEmbedding {
                values,
                column: column.to_string(),
                fell_back: false,
            });
        }

        if column != PAGE_CONTENT_EMBEDDING {
            if let Some(values) = self.embedding(PAGE_CONTENT_EMBEDDING)? {
                return Ok(ResolvedEmbedding {
                    values,
                    column: PAGE_CONTENT_EMBEDDING.to_string(),
                    fell_back: true,
                });
            }
        }

        Err(CoreError::MissingEmbedding {
            id: self.id.clone(),
            column: column.to_string(),
            fallback: PAGE_CONTENT_EMBEDDING.to_string(),
        })
    }
}

/// A vector as written to the remote index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, Value>,
}
