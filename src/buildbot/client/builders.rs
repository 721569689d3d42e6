use super::core::{Query, Transport, API_PREFIX};
use super::BuildbotClient;
use crate::buildbot::types::{Builder, Worker};
use crate::error::Result;

/// Fetches builders by id without touching any cache.
///
/// An empty id list returns immediately without a request.
pub(crate) async fn fetch_builders(transport: &Transport, ids: &[u64]) -> Result<Vec<Builder>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let path = Query::new()
        .push_ids("builderids", ids)
        .apply(&format!("{API_PREFIX}/builders"));
    transport.fetch_envelope(&path).await?.collection("builders")
}

impl BuildbotClient {
    /// All workers, ordered by name.
    pub async fn workers(&self) -> Result<Vec<Worker>> {
        let path = Query::new()
            .push("order", "name")
            .apply(&format!("{API_PREFIX}/workers"));
        self.transport.fetch_envelope(&path).await?.collection("workers")
    }

    pub async fn worker(&self, id: u64) -> Result<Option<Worker>> {
        let path = format!("{API_PREFIX}/workers/{id}");
        self.transport.fetch_envelope(&path).await?.first("workers")
    }

    /// All builders, ordered by name. Records every builder name in the cache.
    pub async fn all_builders(&self) -> Result<Vec<Builder>> {
        let path = Query::new()
            .push("order", "name")
            .apply(&format!("{API_PREFIX}/builders"));
        let builders: Vec<Builder> = self
            .transport
            .fetch_envelope(&path)
            .await?
            .collection("builders")?;

        self.names.record(&builders).await;
        Ok(builders)
    }

    /// Builders with the given ids. Records every builder name in the cache.
    ///
    /// An empty id list returns immediately without a request.
    pub async fn builders(&self, ids: &[u64]) -> Result<Vec<Builder>> {
        let builders = fetch_builders(&self.transport, ids).await?;
        self.names.record(&builders).await;
        Ok(builders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BUILDERS: &str = r#"{
        "builders": [
            {"builderid": 1, "name": "linux", "masterids": [1], "tags": []},
            {"builderid": 2, "name": "windows", "masterids": [1], "tags": ["win"]}
        ],
        "meta": {"total": 2}
    }"#;

    #[tokio::test]
    async fn test_builders_empty_ids_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/builders")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        let builders = client.builders(&[]).await.unwrap();

        assert!(builders.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_builders_populates_name_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/builders")
            .match_query(Matcher::UrlEncoded("builderids".into(), "1,2".into()))
            .with_header("content-type", "application/json")
            .with_body(BUILDERS)
            .expect(1)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        let builders = client.builders(&[1, 2]).await.unwrap();

        assert_eq!(builders.len(), 2);
        assert_eq!(client.names().cached_name(2).await.as_deref(), Some("windows"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_all_builders_orders_by_name_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/builders")
            .match_query(Matcher::UrlEncoded("order".into(), "name".into()))
            .with_body(BUILDERS)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        let builders = client.all_builders().await.unwrap();

        assert_eq!(builders[0].name, "linux");
        assert_eq!(client.names().len().await, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_worker_absent_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/workers/9")
            .with_body(r#"{"workers": [], "meta": {"total": 0}}"#)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        assert_eq!(client.worker(9).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_workers_missing_field_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/workers")
            .match_query(Matcher::Any)
            .with_body(r#"{"meta": {}}"#)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        assert!(client.workers().await.unwrap().is_empty());
    }
}
