use serde_json::Value;
use tracing::Instrument;
use vecstage_core::{CoreError, VectorIndex, VectorRecord};

use crate::client::PineconeHttpClient;
use crate::mapper::record_to_vector;
use crate::types::{IndexStatsResponse, ListResponse, UpsertRequest, UpsertResponse};
use crate::PineconeError;

/// Data plane handle bound to one index host.
#[derive(Clone, Debug)]
pub struct PineconeIndex {
    client: PineconeHttpClient,
    name: String,
    namespace: Option<String>,
    list_page_size: usize,
}

impl PineconeIndex {
    pub(crate) fn new(
        client: PineconeHttpClient,
        name: String,
        namespace: Option<String>,
        list_page_size: usize,
    ) -> Self {
        Self {
            client,
            name,
            namespace,
            list_page_size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn host(&self) -> &str {
        self.client.base_url()
    }

    /// Sends one upsert request; callers decide the batch boundaries.
    pub async fn upsert_vectors(&self, records: &[VectorRecord]) -> Result<usize, PineconeError> {
        let span = tracing::info_span!(
            "pinecone_upsert",
            index = %self.name,
            namespace = ?self.namespace,
            batch_size = records.len(),
        );

        async {
            let request = UpsertRequest {
                vectors: records.iter().map(record_to_vector).collect(),
                namespace: self.namespace.clone(),
            };

            let response: UpsertResponse = self
                .client
                .post_typed_with_context(
                    "/vectors/upsert",
                    &request,
                    self.namespace.as_deref(),
                    Some(request.vectors.len()),
                )
                .await?;

            let upserted = response.upserted_count.unwrap_or(records.len());
            if upserted != records.len() {
                tracing::warn!(
                    sent = records.len(),
                    upserted = upserted,
                    "pinecone reported a different upsert count"
                );
            }
            Ok::<_, PineconeError>(upserted)
        }
        .instrument(span)
        .await
    }

    pub async fn list_page(
        &self,
        pagination_token: Option<&str>,
    ) -> Result<ListResponse, PineconeError> {
        let mut query = vec![("limit", self.list_page_size.to_string())];
        if let Some(namespace) = &self.namespace {
            query.push(("namespace", namespace.clone()));
        }
        if let Some(token) = pagination_token {
            query.push(("paginationToken", token.to_string()));
        }

        self.client
            .get_typed("/vectors/list", &query, self.namespace.as_deref())
            .await
    }

    /// Follows `pagination.next` until the listing is exhausted.
    pub async fn list_all_ids(&self) -> Result<Vec<String>, PineconeError> {
        let span = tracing::info_span!(
            "pinecone_list_ids",
            index = %self.name,
            namespace = ?self.namespace,
        );

        async {
            let mut ids = Vec::new();
            let mut token: Option<String> = None;
            let mut pages = 0usize;
            loop {
                let page = self.list_page(token.as_deref()).await?;
                pages += 1;
                ids.extend(page.vectors.iter().map(|item| item.id.clone()));

                match page.next_token() {
                    Some(next) if Some(next) != token.as_deref() => token = Some(next.to_string()),
                    _ => break,
                }
            }
            tracing::debug!(pages = pages, ids = ids.len(), "listed pinecone ids");
            Ok::<_, PineconeError>(ids)
        }
        .instrument(span)
        .await
    }

    pub async fn describe_index_stats(&self) -> Result<IndexStatsResponse, PineconeError> {
        self.client
            .post_typed(
                "/describe_index_stats",
                &Value::Object(serde_json::Map::new()),
            )
            .await
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), CoreError> {
        self.upsert_vectors(records).await?;
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.list_all_ids().await?)
    }
}
