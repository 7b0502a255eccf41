use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::PineconeError;

pub const API_VERSION: &str = "2024-07";

#[derive(Clone)]
pub struct PineconeHttpClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for PineconeHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeHttpClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl PineconeHttpClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, PineconeError> {
        Self::with_timeout(base_url, api_key, None)
    }

    pub fn with_timeout(
        base_url: String,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, PineconeError> {
        if api_key.trim().is_empty() {
            return Err(PineconeError::Config("api_key cannot be empty".to_string()));
        }

        reqwest::Url::parse(&base_url)
            .map_err(|err| PineconeError::Config(format!("invalid base_url: {err}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| PineconeError::Config(format!("http client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same credentials and timeout, different host.
    pub fn rebase(&self, base_url: String) -> Result<Self, PineconeError> {
        reqwest::Url::parse(&base_url)
            .map_err(|err| PineconeError::Config(format!("invalid host url: {err}")))?;
        Ok(Self {
            http: self.http.clone(),
            base_url,
            api_key: self.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    pub async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, PineconeError> {
        self.post_typed(path, payload).await
    }

    pub async fn post_typed<Req, Resp>(
        &self,
        path: &str,
        payload: &Req,
    ) -> Result<Resp, PineconeError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        self.post_typed_with_context(path, payload, None, None)
            .await
    }

    pub async fn post_typed_with_context<Req, Resp>(
        &self,
        path: &str,
        payload: &Req,
        namespace: Option<&str>,
        batch_size: Option<usize>,
    ) -> Result<Resp, PineconeError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, path)
            .header("Content-Type", "application/json")
            .json(payload);
        self.send(request, namespace, batch_size).await
    }

    pub async fn get_typed<Resp>(
        &self,
        path: &str,
        query: &[(&str, String)],
        namespace: Option<&str>,
    ) -> Result<Resp, PineconeError>
    where
        Resp: DeserializeOwned,
    {
        let request = self.request(Method::GET, path).query(query);
        self.send(request, namespace, None).await
    }

    async fn send<Resp>(
        &self,
        request: RequestBuilder,
        namespace: Option<&str>,
        batch_size: Option<usize>,
    ) -> Result<Resp, PineconeError>
    where
        Resp: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|err| PineconeError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let value = response
                .json::<Resp>()
                .await
                .map_err(|err| PineconeError::Malformed(err.to_string()))?;
            return Ok(value);
        }

        let retry_after_seconds = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body: Value = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::String(String::new()));

        Err(PineconeError::Api {
            status: status.as_u16(),
            message: error_message(&body),
            retry_after_seconds,
            namespace: namespace.map(ToOwned::to_owned),
            batch_size,
        })
    }
}

// Control plane errors nest as {"error": {"code", "message"}}; data plane
// errors are flat {"code", "message"}.
fn error_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("unknown pinecone error")
        .to_string()
}
