use std::time::Duration;

use crate::client::PineconeHttpClient;
use crate::control::PineconeControl;
use crate::PineconeError;

pub const DEFAULT_CONTROLLER_URL: &str = "https://api.pinecone.io";

pub struct PineconeControlBuilder {
    api_key: Option<String>,
    controller_url: String,
    cloud: String,
    region: String,
    namespace: Option<String>,
    list_page_size: usize,
    ready_timeout: Duration,
    poll_interval: Duration,
    request_timeout: Option<Duration>,
}

impl Default for PineconeControlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PineconeControlBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            namespace: None,
            list_page_size: 100,
            ready_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            request_timeout: None,
        }
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = Some(value.into());
        self
    }

    pub fn controller_url(mut self, value: impl Into<String>) -> Self {
        self.controller_url = value.into();
        self
    }

    pub fn cloud(mut self, value: impl Into<String>) -> Self {
        self.cloud = value.into();
        self
    }

    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = value.into();
        self
    }

    pub fn namespace(mut self, value: impl Into<String>) -> Self {
        self.namespace = Some(value.into());
        self
    }

    pub fn list_page_size(mut self, value: usize) -> Self {
        self.list_page_size = value;
        self
    }

    pub fn ready_timeout(mut self, value: Duration) -> Self {
        self.ready_timeout = value;
        self
    }

    pub fn poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = value;
        self
    }

    pub fn request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = Some(value);
        self
    }

    pub fn api_key_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            if !value.trim().is_empty() {
                self.api_key = Some(value);
            }
        }
        self
    }

    pub fn controller_url_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            if !value.trim().is_empty() {
                self.controller_url = value;
            }
        }
        self
    }

    pub fn namespace_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            if !value.trim().is_empty() {
                self.namespace = Some(value);
            }
        }
        self
    }

    pub fn build(self) -> Result<PineconeControl, PineconeError> {
        let api_key = self
            .api_key
            .ok_or_else(|| PineconeError::Config("api_key is required".to_string()))?;

        // Pinecone caps list pages at 100 ids.
        if self.list_page_size == 0 || self.list_page_size > 100 {
            return Err(PineconeError::Config(
                "list_page_size must be between 1 and 100".to_string(),
            ));
        }
        if self.cloud.trim().is_empty() || self.region.trim().is_empty() {
            return Err(PineconeError::Config(
                "cloud and region cannot be empty".to_string(),
            ));
        }

        let client =
            PineconeHttpClient::with_timeout(self.controller_url, api_key, self.request_timeout)?;

        Ok(PineconeControl::new(
            client,
            self.cloud,
            self.region,
            self.namespace,
            self.list_page_size,
            self.ready_timeout,
            self.poll_interval,
        ))
    }
}
