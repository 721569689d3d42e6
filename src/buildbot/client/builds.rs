use std::fmt;

use serde_json::Value;

use super::core::{Query, API_PREFIX};
use super::BuildbotClient;
use crate::buildbot::types::{Build, BuildRequest, BuildSet, Change, Properties, Step};
use crate::error::Result;

/// Row cap for builder-scoped build listings.
pub const BUILDER_BUILDS_LIMIT: u64 = 300;

/// Control actions accepted by the build endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Stop,
    Rebuild,
}

impl BuildAction {
    pub fn method(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Rebuild => "rebuild",
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

impl BuildbotClient {
    /// Most recent builds of the given builders, newest first.
    ///
    /// `properties` names build properties to embed in each build. An empty
    /// id list returns immediately without a request.
    pub async fn builder_builds(
        &self,
        builder_ids: &[u64],
        properties: &[&str],
    ) -> Result<Vec<Build>> {
        if builder_ids.is_empty() {
            return Ok(Vec::new());
        }

        let path = Query::new()
            .push_ids("builderids", builder_ids)
            .push("order", "-buildid")
            .push("limit", BUILDER_BUILDS_LIMIT)
            .push_all("property", properties)
            .apply(&format!("{API_PREFIX}/builds"));
        self.transport.fetch_envelope(&path).await?.collection("builds")
    }

    /// Builds started for the given build requests.
    ///
    /// `properties` names build properties to embed in each build.
    pub async fn builds_by_request(
        &self,
        reqids: &[u64],
        properties: &[&str],
    ) -> Result<Vec<Build>> {
        if reqids.is_empty() {
            return Ok(Vec::new());
        }

        let path = Query::new()
            .push_ids("reqids", reqids)
            .push_all("property", properties)
            .apply(&format!("{API_PREFIX}/builds"));
        self.transport.fetch_envelope(&path).await?.collection("builds")
    }

    /// Builds identified by `"{builderid}-{number}"` keys.
    pub async fn builds_by_number(&self, bnums: &[String]) -> Result<Vec<Build>> {
        if bnums.is_empty() {
            return Ok(Vec::new());
        }

        let path = Query::new()
            .push("bnums", bnums.join(","))
            .apply(&format!("{API_PREFIX}/builds"));
        self.transport.fetch_envelope(&path).await?.collection("builds")
    }

    /// Builds related to `buildid` (parents and children of its build set).
    pub async fn related_builds(&self, buildid: u64) -> Result<Vec<Build>> {
        let path = Query::new()
            .push("relatedfor", buildid)
            .apply(&format!("{API_PREFIX}/builds"));
        self.transport.fetch_envelope(&path).await?.collection("builds")
    }

    pub async fn build(&self, id: u64) -> Result<Option<Build>> {
        let path = format!("{API_PREFIX}/builds/{id}");
        self.transport.fetch_envelope(&path).await?.first("builds")
    }

    pub async fn build_by_number(&self, builderid: u64, number: u64) -> Result<Option<Build>> {
        let path = format!("{API_PREFIX}/builders/{builderid}/builds/{number}");
        self.transport.fetch_envelope(&path).await?.first("builds")
    }

    pub async fn build_steps(&self, buildid: u64) -> Result<Vec<Step>> {
        let path = format!("{API_PREFIX}/builds/{buildid}/steps");
        self.transport.fetch_envelope(&path).await?.collection("steps")
    }

    /// Properties of a build; empty when the server returns none.
    pub async fn build_properties(&self, buildid: u64) -> Result<Properties> {
        let path = format!("{API_PREFIX}/builds/{buildid}/properties");
        let properties = self
            .transport
            .fetch_envelope(&path)
            .await?
            .first("properties")?;
        Ok(properties.unwrap_or_default())
    }

    pub async fn build_changes(&self, buildid: u64) -> Result<Vec<Change>> {
        let path = format!("{API_PREFIX}/builds/{buildid}/changes");
        self.transport.fetch_envelope(&path).await?.collection("changes")
    }

    pub async fn changes_by_sourcestamp(&self, ssid: u64) -> Result<Vec<Change>> {
        let path = format!("{API_PREFIX}/sourcestamps/{ssid}/changes");
        self.transport.fetch_envelope(&path).await?.collection("changes")
    }

    pub async fn change_builds(&self, changeid: u64) -> Result<Vec<Build>> {
        let path = format!("{API_PREFIX}/changes/{changeid}/builds");
        self.transport.fetch_envelope(&path).await?.collection("builds")
    }

    /// Build requests by id. An empty id list returns without a request.
    pub async fn requests(&self, reqids: &[u64]) -> Result<Vec<BuildRequest>> {
        if reqids.is_empty() {
            return Ok(Vec::new());
        }

        let path = Query::new()
            .push_ids("reqids", reqids)
            .apply(&format!("{API_PREFIX}/buildrequests"));
        self.transport
            .fetch_envelope(&path)
            .await?
            .collection("buildrequests")
    }

    pub async fn buildset(&self, bsid: u64) -> Result<Option<BuildSet>> {
        let path = format!("{API_PREFIX}/buildsets/{bsid}");
        self.transport.fetch_envelope(&path).await?.first("buildsets")
    }

    /// Sends a control action to a build and returns the raw response.
    pub async fn build_action(&self, buildid: u64, action: BuildAction) -> Result<Value> {
        self.transport
            .call_action(&format!("/builds/{buildid}"), action.method(), None)
            .await
    }
}
