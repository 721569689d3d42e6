use std::fmt::Display;
use std::sync::Arc;

use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::envelope::Envelope;
use crate::error::{BuildviewError, Result};

/// Path prefix of the Buildbot REST API.
pub const API_PREFIX: &str = "/api/v2";

const JSON: &str = "application/json";

/// Request body of an action call, shaped like a JSON-RPC 2.0 request.
///
/// `id` echoes the target resource path rather than a request counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub id: String,
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl RpcEnvelope {
    pub fn new(resource_path: &str, action: &str, params: Option<Value>) -> Self {
        Self {
            id: resource_path.to_string(),
            jsonrpc: "2.0".to_string(),
            method: action.to_string(),
            params: params.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        }
    }
}

/// Network access to a Buildbot backend.
///
/// Every request goes to `backend + path`. There is no retry and no timeout;
/// failures propagate to the caller as-is.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    backend: Arc<str>,
}

impl Transport {
    pub fn new(backend: &str) -> Result<Self> {
        let parsed = Url::parse(backend)
            .map_err(|e| BuildviewError::Config(format!("Invalid backend URL: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(BuildviewError::Config(format!(
                "Backend URL cannot be used as a base: {backend}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("buildview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildviewError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            backend: Arc::from(backend.trim_end_matches('/')),
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Full request URL for a path relative to the backend.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.backend)
    }

    /// GETs `path` and returns the decoded JSON body.
    pub async fn fetch_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {url}");

        let response = self.client.get(&url).header(ACCEPT, JSON).send().await?;
        decode(response).await
    }

    /// GETs `path` and validates the body as a resource envelope.
    pub(crate) async fn fetch_envelope(&self, path: &str) -> Result<Envelope> {
        let body = self.fetch_json(path).await?;
        Envelope::parse(path, body)
    }

    /// POSTs an action call for `resource_path` (e.g. `/builds/12`) and returns
    /// the decoded response body.
    pub async fn call_action(
        &self,
        resource_path: &str,
        action: &str,
        params: Option<Value>,
    ) -> Result<Value> {
        let url = self.url(&format!("{API_PREFIX}{resource_path}"));
        let envelope = RpcEnvelope::new(resource_path, action, params);
        debug!("POST {url} method={action}");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(serde_json::to_vec(&envelope)?)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(BuildviewError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

/// Query string builder that leaves out empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key=value` unless the value renders empty.
    #[must_use]
    pub fn push(mut self, key: &str, value: impl Display) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    /// Adds `key=a,b,c`, or nothing for an empty list.
    #[must_use]
    pub fn push_ids(self, key: &str, ids: &[u64]) -> Self {
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.push(key, joined)
    }

    /// Adds `key=value` once per element.
    #[must_use]
    pub fn push_all<T: Display>(self, key: &str, values: &[T]) -> Self {
        values.iter().fold(self, |query, value| query.push(key, value))
    }

    /// Adds `key=value` only when a value is given.
    #[must_use]
    pub fn push_opt<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded `k=v&k=v` form, without a leading `?`.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// `path?query`, or just `path` when the query is empty.
    pub fn apply(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.encode())
        }
    }
}
