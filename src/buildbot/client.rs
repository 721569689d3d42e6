mod builders;
mod builds;
mod core;
mod envelope;
mod logs;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::BackendConfig;
use crate::error::Result;

use super::names::BuilderNames;

pub use self::builds::BuildAction;
pub use self::core::{Query, RpcEnvelope, Transport, API_PREFIX};
pub use self::envelope::Envelope;
pub(crate) use self::builders::fetch_builders;

/// Client for the Buildbot REST API.
///
/// Owns the builder name cache, so two clients never share cached names.
/// Cloning is cheap and clones share both the connection pool and the cache.
#[derive(Debug, Clone)]
pub struct BuildbotClient {
    transport: Transport,
    names: BuilderNames,
}

impl BuildbotClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Self::with_backend(&config.backend)
    }

    pub fn with_backend(backend: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(backend)?,
            names: BuilderNames::new(),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn names(&self) -> &BuilderNames {
        &self.names
    }

    /// GETs an arbitrary backend path and returns the JSON body.
    pub async fn fetch_json(&self, path: &str) -> Result<Value> {
        self.transport.fetch_json(path).await
    }

    /// Calls an action on a resource, e.g. `("/builds/12", "stop", None)`.
    pub async fn call_action(
        &self,
        resource_path: &str,
        action: &str,
        params: Option<Value>,
    ) -> Result<Value> {
        self.transport.call_action(resource_path, action, params).await
    }

    /// Maps every id to its builder name, fetching only the uncached ones.
    pub async fn resolve_names(&self, ids: &[u64]) -> Result<IndexMap<u64, String>> {
        self.names.resolve_names(&self.transport, ids).await
    }

    pub async fn resolve_name(&self, id: u64) -> Result<String> {
        self.names.resolve_name(&self.transport, id).await
    }
}
