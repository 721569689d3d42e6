use super::core::{Query, API_PREFIX};
use super::BuildbotClient;
use crate::buildbot::types::{Log, LogChunk};
use crate::error::Result;

impl BuildbotClient {
    pub async fn step_logs(&self, stepid: u64) -> Result<Vec<Log>> {
        let path = format!("{API_PREFIX}/steps/{stepid}/logs");
        self.transport.fetch_envelope(&path).await?.collection("logs")
    }

    /// A page of log content. `offset` and `limit` are sent only when given.
    pub async fn log_content(
        &self,
        logid: u64,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<LogChunk>> {
        let path = Query::new()
            .push_opt("offset", offset)
            .push_opt("limit", limit)
            .apply(&format!("{API_PREFIX}/logs/{logid}/contents"));
        self.transport
            .fetch_envelope(&path)
            .await?
            .collection("logchunks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const CHUNKS: &str = r#"{"logchunks": [{"logid": 7, "firstline": 0, "content": "line 1\nline 2\n"}]}"#;

    #[tokio::test]
    async fn test_log_content_without_paging() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/logs/7/contents")
            .with_body(CHUNKS)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        let chunks = client.log_content(7, None, None).await.unwrap();

        assert_eq!(chunks[0].content, "line 1\nline 2\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_log_content_with_zero_offset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/logs/7/contents")
            .match_query(Matcher::Exact("offset=0&limit=2000".into()))
            .with_body(CHUNKS)
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        client.log_content(7, Some(0), Some(2000)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_step_logs() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/steps/3/logs")
            .with_body(
                r#"{"logs": [{"logid": 7, "stepid": 3, "name": "stdio", "slug": "stdio", "type": "s", "num_lines": 2, "complete": true}]}"#,
            )
            .create_async()
            .await;

        let client = BuildbotClient::with_backend(&server.url()).unwrap();
        let logs = client.step_logs(3).await.unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].slug, "stdio");
    }
}
