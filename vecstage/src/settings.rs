use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vecstage_core::metadata::default_dropped_columns;
use vecstage_core::{is_embedding_column, IndexSpec, Metric, PAGE_CONTENT_EMBEDDING};
use vecstage_pinecone::{PineconeControl, DEFAULT_CONTROLLER_URL};

use crate::StagingError;

/// `text-embedding-3-large` output width.
pub const DEFAULT_DIMENSION: usize = 3072;
/// 40 full-width vectors serialize to roughly 1.7 MB, under Pinecone's
/// 2 MB upsert body limit.
pub const DEFAULT_BATCH_SIZE: usize = 40;
/// Serialized record budget per upsert, leaving room for the request envelope
/// under the 2 MiB limit.
pub const DEFAULT_MAX_BATCH_BYTES: usize = 2_000_000;

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub parquet_path: PathBuf,
    pub index_name: String,
    pub namespace: Option<String>,
    pub embedding_column: String,
    pub dimension: usize,
    pub metric: Metric,
    pub batch_size: usize,
    pub max_batch_bytes: usize,
    pub drop_columns: Vec<String>,
    pub cloud: String,
    pub region: String,
    pub controller_url: String,
    pub ready_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Values given on the command line or through the environment. They win
/// over the settings file.
#[derive(Clone, Default, clap::Args)]
pub struct SettingsOverrides {
    #[arg(long, global = true, env = "VECSTAGE_PARQUET")]
    pub parquet: Option<PathBuf>,

    #[arg(long, global = true, env = "PINECONE_INDEX")]
    pub index: Option<String>,

    #[arg(long, global = true, env = "PINECONE_NAMESPACE")]
    pub namespace: Option<String>,

    /// Column holding the vectors to upload, e.g. `technical_summary_embedding`.
    #[arg(long, global = true)]
    pub embedding_column: Option<String>,

    #[arg(long, global = true)]
    pub dimension: Option<usize>,

    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    #[arg(long, global = true, env = "PINECONE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true, env = "PINECONE_CONTROLLER_URL")]
    pub controller_url: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("Settings")
            .field("parquet_path", &self.parquet_path)
            .field("index_name", &self.index_name)
            .field("namespace", &self.namespace)
            .field("embedding_column", &self.embedding_column)
            .field("dimension", &self.dimension)
            .field("metric", &self.metric)
            .field("batch_size", &self.batch_size)
            .field("max_batch_bytes", &self.max_batch_bytes)
            .field("drop_columns", &self.drop_columns)
            .field("cloud", &self.cloud)
            .field("region", &self.region)
            .field("controller_url", &self.controller_url)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("api_key", &api_key)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parquet_path: PathBuf::from("staging.parquet"),
            index_name: "staged-documents".to_string(),
            namespace: None,
            embedding_column: PAGE_CONTENT_EMBEDDING.to_string(),
            dimension: DEFAULT_DIMENSION,
            metric: Metric::Cosine,
            batch_size: DEFAULT_BATCH_SIZE,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            drop_columns: default_dropped_columns(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            ready_timeout_secs: 120,
            request_timeout_secs: None,
            api_key: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self, StagingError> {
        toml::from_str(raw).map_err(|err| StagingError::Settings(err.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StagingError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| StagingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads the TOML file when given, otherwise the defaults, then applies
    /// command line and environment overrides on top.
    pub fn load(
        config: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, StagingError> {
        let mut settings = match config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(overrides);
        Ok(settings)
    }

    /// Replaces every field the overrides set; unset overrides keep the
    /// current value.
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(value) = &overrides.parquet {
            self.parquet_path = value.clone();
        }
        if let Some(value) = &overrides.index {
            self.index_name = value.clone();
        }
        if let Some(value) = &overrides.namespace {
            self.namespace = Some(value.clone());
        }
        if let Some(value) = &overrides.embedding_column {
            self.embedding_column = value.clone();
        }
        if let Some(value) = overrides.dimension {
            self.dimension = value;
        }
        if let Some(value) = overrides.batch_size {
            self.batch_size = value;
        }
        if let Some(value) = &overrides.api_key {
            self.api_key = Some(value.clone());
        }
        if let Some(value) = &overrides.controller_url {
            self.controller_url = value.clone();
        }
    }

    pub fn validate(&self) -> Result<(), StagingError> {
        if self.index_name.trim().is_empty() {
            return Err(StagingError::Settings("index_name cannot be empty".to_string()));
        }
        if self.dimension == 0 {
            return Err(StagingError::Settings(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(StagingError::Settings(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.max_batch_bytes == 0 {
            return Err(StagingError::Settings(
                "max_batch_bytes must be greater than 0".to_string(),
            ));
        }
        if !is_embedding_column(&self.embedding_column) {
            return Err(StagingError::Settings(format!(
                "embedding_column '{}' must end with '_embedding'",
                self.embedding_column
            )));
        }
        Ok(())
    }

    pub fn index_spec(&self) -> IndexSpec {
        IndexSpec::new(self.index_name.clone(), self.dimension).metric(self.metric)
    }

    pub fn pinecone_control(&self) -> Result<PineconeControl, StagingError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| StagingError::Settings("PINECONE_API_KEY is not set".to_string()))?;

        let mut builder = PineconeControl::builder()
            .api_key(api_key)
            .controller_url(self.controller_url.clone())
            .cloud(self.cloud.clone())
            .region(self.region.clone())
            .ready_timeout(Duration::from_secs(self.ready_timeout_secs));
        if let Some(namespace) = &self.namespace {
            builder = builder.namespace(namespace.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build()?)
    }
}
