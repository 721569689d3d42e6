use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A property value paired with the name of its source (e.g. `"Build"`).
pub type Property = (serde_json::Value, String);

/// Build properties keyed by name, in the order the server sent them.
pub type Properties = IndexMap<String, Property>;

/// A worker registered with the Buildbot master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub workerid: u64,
    pub name: String,
    #[serde(default)]
    pub graceful: bool,
    #[serde(default)]
    pub paused: bool,
    /// Masters this worker is currently attached to; empty when disconnected.
    #[serde(default)]
    pub connected_to: Vec<MasterRef>,
    #[serde(default)]
    pub workerinfo: WorkerInfo,
}

impl Worker {
    pub fn is_connected(&self) -> bool {
        !self.connected_to.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRef {
    pub masterid: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub access_uri: Option<String>,
    pub admin: Option<String>,
    pub host: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A builder (a named build configuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Builder {
    pub builderid: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_format: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub masterids: Vec<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single build of a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub buildid: u64,
    pub builderid: u64,
    /// Per-builder sequence number.
    pub number: u64,
    #[serde(default)]
    pub buildrequestid: Option<u64>,
    #[serde(default)]
    pub complete: bool,
    /// Unix timestamp; absent while the build is running.
    #[serde(default)]
    pub complete_at: Option<i64>,
    #[serde(default)]
    pub started_at: i64,
    #[serde(default)]
    pub masterid: Option<u64>,
    #[serde(default)]
    pub workerid: Option<u64>,
    /// Raw result code; `None` means in progress.
    #[serde(default)]
    pub results: Option<i64>,
    #[serde(default)]
    pub state_string: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Build {
    /// Composite `"{builderid}-{number}"` key, the form used by `bnums` filters.
    pub fn bnum(&self) -> String {
        format!("{}-{}", self.builderid, self.number)
    }

    /// String value of a property, if present and a string.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|(value, _)| value.as_str())
    }
}

/// A hyperlink attached to a build step, as received from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUrl {
    pub name: String,
    pub url: String,
}

impl StepUrl {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub stepid: u64,
    pub buildid: u64,
    pub number: u64,
    pub name: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub complete_at: Option<i64>,
    #[serde(default)]
    pub started_at: Option<i64>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub results: Option<i64>,
    #[serde(default)]
    pub state_string: String,
    #[serde(default)]
    pub urls: Vec<StepUrl>,
}

/// Metadata of a log attached to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub logid: u64,
    pub stepid: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub num_lines: u64,
    /// Log type code (`s` stdio, `t` text, `h` html).
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A contiguous slice of log content starting at `firstline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogChunk {
    pub logid: u64,
    pub firstline: u64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub changeid: u64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub revlink: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub ssid: u64,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub codebase: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub patch: Option<serde_json::Value>,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSet {
    pub bsid: u64,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub complete_at: Option<i64>,
    #[serde(default)]
    pub external_idstring: Option<String>,
    #[serde(default)]
    pub parent_buildid: Option<u64>,
    #[serde(default)]
    pub parent_relationship: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub results: Option<i64>,
    #[serde(default)]
    pub sourcestamps: Vec<SourceStamp>,
    #[serde(default)]
    pub submitted_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub buildrequestid: Option<u64>,
    pub buildsetid: u64,
    #[serde(default)]
    pub builderid: Option<u64>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub results: Option<i64>,
}
