// Local placeholder replies

use async_trait::async_trait;

use super::{AnalysisReply, AnalysisRequest, Dispatcher};
use crate::types::DispatchError;

pub const UPLOAD_HINT: &str = "Tip: Upload a dataset to unlock data-aware answers. ";
pub const NOT_CONNECTED: &str = "Backend not connected yet. Once connected, the AI will analyze your data, generate charts, and predictions here.";
pub const ANALYZING: &str = "Analyzing with the connected AI agent...";

pub struct DispatchRouter;

impl DispatchRouter {
    /// Deterministic reply for a message. The text itself does not change the
    /// reply yet; only data presence and backend availability do.
    pub fn dispatch(_text: &str, has_data: bool, backend_available: bool) -> String {
        let hint = if has_data { "" } else { UPLOAD_HINT };
        let status = if backend_available { ANALYZING } else { NOT_CONNECTED };
        format!("{}{}", hint, status)
    }
}

/// Dispatcher used in demo mode and whenever live analysis is off
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderDispatcher {
    backend_available: bool,
}

impl PlaceholderDispatcher {
    pub fn new(backend_available: bool) -> Self {
        Self { backend_available }
    }
}

#[async_trait]
impl Dispatcher for PlaceholderDispatcher {
    async fn dispatch(&self, request: &AnalysisRequest) -> Result<AnalysisReply, DispatchError> {
        Ok(AnalysisReply::text(DispatchRouter::dispatch(
            &request.message,
            request.has_data(),
            self.backend_available,
        )))
    }

    fn is_live(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_demo_without_data() {
        let reply = DispatchRouter::dispatch("hello", false, false);
        assert_eq!(reply, format!("{}{}", UPLOAD_HINT, NOT_CONNECTED));
    }

    #[test]
    fn test_demo_with_data() {
        assert_eq!(DispatchRouter::dispatch("hello", true, false), NOT_CONNECTED);
    }

    #[test]
    fn test_connected() {
        assert_eq!(DispatchRouter::dispatch("hello", true, true), ANALYZING);
        assert!(DispatchRouter::dispatch("hello", false, true).starts_with("Tip:"));
    }

    #[tokio::test]
    async fn test_placeholder_dispatcher_uses_request_data() {
        let dispatcher = PlaceholderDispatcher::new(false);
        let request = AnalysisRequest {
            session_id: Uuid::new_v4(),
            message: "sum of sales".to_string(),
            file_meta: None,
            preview: None,
        };
        let reply = dispatcher.dispatch(&request).await.unwrap();
        assert!(reply.reply.starts_with(UPLOAD_HINT));
        assert!(reply.artifacts.is_empty());
    }
}
