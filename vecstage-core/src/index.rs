use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CoreError, VectorRecord};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            "dotproduct" => Ok(Metric::Dotproduct),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric: Metric::default(),
        }
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

/// Data-plane handle for a single index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), CoreError>;
    /// Every id stored in the index, across all pages.
    async fn list_ids(&self) -> Result<Vec<String>, CoreError>;
}

/// Control plane: provisions indexes and hands out data-plane handles.
#[async_trait]
pub trait IndexControl: Send + Sync {
    type Index: VectorIndex;

    /// Returns a handle to `spec.name`, creating the index when absent.
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<Self::Index, CoreError>;

    /// Returns a handle to an existing index without creating anything.
    /// Fails with `CoreError::IndexNotFound` when `name` is absent.
    async fn open_index(&self, name: &str) -> Result<Self::Index, CoreError>;
}
