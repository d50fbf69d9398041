// HTTP client for the remote analysis service

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{AnalysisReply, AnalysisRequest, Dispatcher};
use crate::types::DispatchError;

const ANALYZE_PATH: &str = "/api/analyze";
const HEALTH_PATH: &str = "/health";

pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpDispatcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: join_url(base_url, ANALYZE_PATH),
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout)
        } else {
            DispatchError::Transport(err)
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &AnalysisRequest) -> Result<AnalysisReply, DispatchError> {
        info!(
            session_id = %request.session_id,
            message_len = request.message.len(),
            has_data = request.has_data(),
            "Sending message to analysis service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Analysis service rejected request");
            return Err(DispatchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let reply: AnalysisReply =
            serde_json::from_str(&body).map_err(|e| DispatchError::Decode(e.to_string()))?;

        info!(
            reply_len = reply.reply.len(),
            artifacts = reply.artifacts.len(),
            "Analysis service replied"
        );
        Ok(reply)
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Check whether the analysis service answers its health endpoint in time.
/// Any failure reports the backend as unavailable.
pub async fn probe(base_url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build probe client: {}", e);
            return false;
        }
    };

    let url = join_url(base_url, HEALTH_PATH);
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            info!(%url, "Analysis backend is reachable");
            true
        }
        Ok(response) => {
            warn!(
                %url,
                status = response.status().as_u16(),
                "Analysis backend unhealthy, using demo mode"
            );
            false
        }
        Err(e) => {
            warn!(%url, "Analysis backend unreachable, using demo mode: {}", e);
            false
        }
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileMeta, PreviewResult};
    use mockito::Matcher;
    use uuid::Uuid;

    fn request(with_file: bool) -> AnalysisRequest {
        AnalysisRequest {
            session_id: Uuid::new_v4(),
            message: "total by region".to_string(),
            file_meta: with_file.then(|| FileMeta {
                name: "sales.csv".to_string(),
                mime_type: "text/csv".to_string(),
                size_bytes: 10,
            }),
            preview: with_file.then(PreviewResult::empty),
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://x/", "/health"), "http://x/health");
        assert_eq!(join_url("http://x", "/health"), "http://x/health");
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "message": "total by region",
                "fileMeta": { "name": "sales.csv", "mimeType": "text/csv", "sizeBytes": 10 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply":"North leads with 42%.","artifacts":[{"kind":"chart"}]}"#)
            .create_async()
            .await;

        let dispatcher = HttpDispatcher::new(&server.url(), Duration::from_secs(5)).unwrap();
        let reply = dispatcher.dispatch(&request(true)).await.unwrap();

        assert_eq!(reply.reply, "North leads with 42%.");
        assert_eq!(reply.artifacts.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_sends_nulls_without_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "fileMeta": null,
                "preview": null
            })))
            .with_status(200)
            .with_body(r#"{"reply":"ok"}"#)
            .create_async()
            .await;

        let dispatcher = HttpDispatcher::new(&server.url(), Duration::from_secs(5)).unwrap();
        let reply = dispatcher.dispatch(&request(false)).await.unwrap();
        assert_eq!(reply.reply, "ok");
        assert!(reply.artifacts.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analyze")
            .with_status(500)
            .create_async()
            .await;

        let dispatcher = HttpDispatcher::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = dispatcher.dispatch(&request(false)).await.unwrap_err();
        assert!(matches!(err, DispatchError::Status(500)));
    }

    #[tokio::test]
    async fn test_dispatch_bad_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analyze")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let dispatcher = HttpDispatcher::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = dispatcher.dispatch(&request(false)).await.unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_probe() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/health").with_status(200).create_async().await;
        assert!(probe(&server.url(), Duration::from_secs(2)).await);

        // Nothing listens on port 9 in test environments
        assert!(!probe("http://127.0.0.1:9", Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn test_probe_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/health").with_status(503).create_async().await;
        assert!(!probe(&server.url(), Duration::from_secs(2)).await);
    }
}
