use std::time::{Duration, Instant};

use tracing::Instrument;
use vecstage_core::{CoreError, IndexControl, IndexSpec};

use crate::client::PineconeHttpClient;
use crate::config::PineconeControlBuilder;
use crate::index::PineconeIndex;
use crate::mapper::host_to_base_url;
use crate::types::{
    CreateIndexRequest, CreateIndexSpec, IndexList, IndexModel, ServerlessSpec,
};
use crate::PineconeError;

#[derive(Clone, Debug)]
pub struct PineconeControl {
    client: PineconeHttpClient,
    cloud: String,
    region: String,
    namespace: Option<String>,
    list_page_size: usize,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl PineconeControl {
    pub fn builder() -> PineconeControlBuilder {
        PineconeControlBuilder::new()
    }

    pub(crate) fn new(
        client: PineconeHttpClient,
        cloud: String,
        region: String,
        namespace: Option<String>,
        list_page_size: usize,
        ready_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            cloud,
            region,
            namespace,
            list_page_size,
            ready_timeout,
            poll_interval,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexModel>, PineconeError> {
        let list: IndexList = self.client.get_typed("/indexes", &[], None).await?;
        Ok(list.indexes)
    }

    pub async fn describe_index(&self, name: &str) -> Result<IndexModel, PineconeError> {
        self.client
            .get_typed(&format!("/indexes/{name}"), &[], None)
            .await
    }

    pub async fn create_index(&self, spec: &IndexSpec) -> Result<IndexModel, PineconeError> {
        let request = CreateIndexRequest {
            name: spec.name.clone(),
            dimension: spec.dimension,
            metric: spec.metric.as_str().to_string(),
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: self.cloud.clone(),
                    region: self.region.clone(),
                },
            },
        };
        self.client.post_typed("/indexes", &request).await
    }

    async fn wait_until_ready(&self, name: &str) -> Result<IndexModel, PineconeError> {
        let started = Instant::now();
        loop {
            let model = self.describe_index(name).await?;
            if model.status.ready {
                return Ok(model);
            }
            if started.elapsed() >= self.ready_timeout {
                return Err(PineconeError::NotReady {
                    index: name.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                    state: model.status.state,
                });
            }
            tracing::debug!(index = %name, state = ?model.status.state, "waiting for index");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Binds a data plane handle to an index host without touching the
    /// control plane.
    pub fn index_at_host(&self, name: &str, host: &str) -> Result<PineconeIndex, PineconeError> {
        let client = self.client.rebase(host_to_base_url(host))?;
        Ok(PineconeIndex::new(
            client,
            name.to_string(),
            self.namespace.clone(),
            self.list_page_size,
        ))
    }

    /// Binds to an index that already exists. Never creates one; a missing
    /// index surfaces as the control plane's 404.
    pub async fn open(&self, name: &str) -> Result<PineconeIndex, PineconeError> {
        let span = tracing::info_span!("pinecone_open_index", index = %name);
        async {
            let mut model = self.describe_index(name).await?;
            if !model.status.ready || model.host.is_none() {
                model = self.wait_until_ready(name).await?;
            }
            let host = model.host.ok_or_else(|| {
                PineconeError::Malformed(format!("index '{name}' has no host"))
            })?;
            self.index_at_host(name, &host)
        }
        .instrument(span)
        .await
    }

    pub async fn ensure(&self, spec: &IndexSpec) -> Result<PineconeIndex, PineconeError> {
        let span = tracing::info_span!(
            "pinecone_ensure_index",
            index = %spec.name,
            dimension = spec.dimension,
            metric = %spec.metric,
        );
        self.ensure_inner(spec).instrument(span).await
    }

    async fn ensure_inner(&self, spec: &IndexSpec) -> Result<PineconeIndex, PineconeError> {
        let existing = self
            .list_indexes()
            .await?
            .into_iter()
            .find(|model| model.name == spec.name);

        match &existing {
            Some(model) => {
                if let Some(index_dim) = model.dimension {
                    if index_dim != spec.dimension {
                        tracing::warn!(
                            index = %spec.name,
                            index_dim = index_dim,
                            expected_dim = spec.dimension,
                            "existing pinecone index dimension differs from configured dimension"
                        );
                    }
                }
                tracing::info!(index = %spec.name, "pinecone index already exists");
            }
            None => {
                tracing::info!(
                    index = %spec.name,
                    cloud = %self.cloud,
                    region = %self.region,
                    "creating pinecone index"
                );
                match self.create_index(spec).await {
                    Ok(_) => {}
                    // Created concurrently by someone else.
                    Err(err) if err.status() == Some(409) => {
                        tracing::info!(index = %spec.name, "pinecone index created concurrently");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        let model = match existing {
            Some(model) if model.status.ready && model.host.is_some() => model,
            _ => self.wait_until_ready(&spec.name).await?,
        };
        let host = model.host.ok_or_else(|| {
            PineconeError::Malformed(format!("index '{}' has no host", spec.name))
        })?;

        self.index_at_host(&spec.name, &host)
    }
}

#[async_trait::async_trait]
impl IndexControl for PineconeControl {
    type Index = PineconeIndex;

    async fn ensure_index(&self, spec: &IndexSpec) -> Result<PineconeIndex, CoreError> {
        self.ensure(spec).await.map_err(CoreError::from)
    }

    async fn open_index(&self, name: &str) -> Result<PineconeIndex, CoreError> {
        match self.open(name).await {
            Ok(index) => Ok(index),
            Err(err) if err.status() == Some(404) => {
                Err(CoreError::IndexNotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
