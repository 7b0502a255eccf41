use serde::Serialize;
use tracing::Instrument;
use vecstage_core::batch::plan_batches;
use vecstage_core::metadata::{metadata_size, METADATA_BYTE_LIMIT};
use vecstage_core::{CoreError, IdDiff, IndexControl, VectorIndex, VectorRecord};

use crate::{
    clean_metadata_for_vector_store, parquet_to_frame, Settings, StagedFrame, StagingError,
};

// Ids echoed in mismatch logs; the full sets live on `IdDiff`.
const MISMATCH_SAMPLE: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub rows: usize,
    pub batches: usize,
    pub fallbacks: usize,
    pub oversized_metadata: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub upload: UploadSummary,
    pub diff: IdDiff,
}

/// Moves staged embeddings into an index and checks that they arrived.
pub struct VectorStore<C: IndexControl> {
    control: C,
    settings: Settings,
    index: Option<C::Index>,
}

impl<C: IndexControl> VectorStore<C> {
    pub fn new(control: C, settings: Settings) -> Result<Self, StagingError> {
        settings.validate()?;
        Ok(Self {
            control,
            settings,
            index: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn index(&self) -> Option<&C::Index> {
        self.index.as_ref()
    }

    fn bound_index(&self) -> Result<&C::Index, StagingError> {
        self.index.as_ref().ok_or(StagingError::NotInitialized)
    }

    /// Creates the index when absent and binds the data plane handle.
    /// Safe to call repeatedly.
    pub async fn initialize_index(&mut self) -> Result<&C::Index, StagingError> {
        let spec = self.settings.index_spec();
        tracing::info!(
            index = %spec.name,
            dimension = spec.dimension,
            metric = %spec.metric,
            "initializing index"
        );
        let index = self.control.ensure_index(&spec).await?;
        Ok(&*self.index.insert(index))
    }

    /// Binds the data plane handle to an index that must already exist.
    /// Leaves the remote side untouched.
    pub async fn connect_index(&mut self) -> Result<&C::Index, StagingError> {
        let name = self.settings.index_name.clone();
        tracing::info!(index = %name, "connecting to existing index");
        let index = self.control.open_index(&name).await?;
        Ok(&*self.index.insert(index))
    }

    /// Builds upload records from a frame: cleaned metadata plus the
    /// requested embedding, falling back to the page content embedding.
    pub fn prepare_records(
        &self,
        frame: &StagedFrame,
    ) -> Result<(Vec<VectorRecord>, UploadSummary), StagingError> {
        let column = self.settings.embedding_column.as_str();
        if !frame.has_column(column) {
            tracing::warn!(
                column = column,
                "embedding column missing from staging file; every row falls back"
            );
        }

        let metadata_rows = clean_metadata_for_vector_store(frame, &self.settings.drop_columns);
        let mut summary = UploadSummary {
            rows: frame.len(),
            ..UploadSummary::default()
        };

        let mut records = Vec::with_capacity(frame.len());
        for (staged, row) in frame.records().iter().zip(metadata_rows) {
            let resolved = staged.resolve_embedding(column)?;
            if resolved.fell_back {
                summary.fallbacks += 1;
            }
            if resolved.values.len() != self.settings.dimension {
                return Err(CoreError::DimensionMismatch {
                    id: staged.id.clone(),
                    expected: self.settings.dimension,
                    got: resolved.values.len(),
                }
                .into());
            }

            let size = metadata_size(&row.metadata);
            if size > METADATA_BYTE_LIMIT {
                summary.oversized_metadata += 1;
                tracing::warn!(
                    id = %row.id,
                    bytes = size,
                    limit = METADATA_BYTE_LIMIT,
                    "metadata exceeds per-vector limit"
                );
            }

            records.push(VectorRecord {
                id: row.id,
                values: resolved.values,
                metadata: row.metadata,
            });
        }

        Ok((records, summary))
    }

    /// Upserts every staged row in batches capped by `batch_size` records
    /// and `max_batch_bytes` of serialized records. A failing batch aborts
    /// the upload; earlier batches stay in the index.
    pub async fn staging_to_vector_store(&self) -> Result<UploadSummary, StagingError> {
        let index = self.bound_index()?;
        let frame = parquet_to_frame(&self.settings.parquet_path)?;
        let (records, mut summary) = self.prepare_records(&frame)?;

        let batches = plan_batches(
            &records,
            self.settings.batch_size,
            self.settings.max_batch_bytes,
        );
        let total_batches = batches.len();
        tracing::info!(
            path = %self.settings.parquet_path.display(),
            rows = summary.rows,
            fallbacks = summary.fallbacks,
            embedding_column = %self.settings.embedding_column,
            total_batches = total_batches,
            "uploading staged embeddings"
        );

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let span = tracing::info_span!(
                "upsert_batch",
                batch_index = batch_index + 1,
                total_batches = total_batches,
                batch_size = batch.len(),
            );
            index.upsert(batch).instrument(span).await?;
            summary.batches += 1;
        }

        tracing::info!(rows = summary.rows, batches = summary.batches, "upload finished");
        Ok(summary)
    }

    /// Diffs staged ids against every id the index lists. Mismatches are
    /// logged and returned, never repaired.
    pub async fn validate_index(&self) -> Result<IdDiff, StagingError> {
        let index = self.bound_index()?;
        let frame = parquet_to_frame(&self.settings.parquet_path)?;
        let remote = index.list_ids().await?;
        let remote_count = remote.len();
        let diff = IdDiff::between(frame.ids(), remote);

        if diff.is_clean() {
            tracing::info!(
                local = frame.len(),
                remote = remote_count,
                "all staged ids present in index"
            );
        } else {
            tracing::warn!(
                local = frame.len(),
                remote = remote_count,
                missing_from_remote = diff.missing_from_remote.len(),
                unexpected_in_remote = diff.unexpected_in_remote.len(),
                missing_sample = ?diff.missing_from_remote.iter().take(MISMATCH_SAMPLE).collect::<Vec<_>>(),
                unexpected_sample = ?diff.unexpected_in_remote.iter().take(MISMATCH_SAMPLE).collect::<Vec<_>>(),
                "staged ids and index ids differ"
            );
        }

        Ok(diff)
    }

    pub async fn run(&mut self) -> Result<RunReport, StagingError> {
        self.initialize_index().await?;
        let upload = self.staging_to_vector_store().await?;
        let diff = self.validate_index().await?;
        Ok(RunReport { upload, diff })
    }
}
