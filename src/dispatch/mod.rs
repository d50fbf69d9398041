// Dispatch: turning a user message into a reply

pub mod remote;
pub mod router;

pub use remote::{probe, HttpDispatcher};
pub use router::{DispatchRouter, PlaceholderDispatcher};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::models::{DatasetView, FileMeta, PreviewResult};
use crate::types::DispatchError;

/// Request body of the remote analysis contract
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub session_id: Uuid,
    pub message: String,
    pub file_meta: Option<FileMeta>,
    pub preview: Option<PreviewResult>,
}

impl AnalysisRequest {
    /// Build a request from the dataset snapshot current at send time
    pub fn new(session_id: Uuid, message: &str, dataset: &DatasetView) -> Self {
        Self {
            session_id,
            message: message.to_string(),
            file_meta: dataset.file.clone(),
            preview: dataset.file.as_ref().map(|_| dataset.preview.clone()),
        }
    }

    pub fn has_data(&self) -> bool {
        self.file_meta.is_some()
    }
}

/// Response body of the remote analysis contract
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisReply {
    pub reply: String,
    /// Opaque to this client
    #[serde(default)]
    pub artifacts: Vec<serde_json::Value>,
}

impl AnalysisReply {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            artifacts: Vec::new(),
        }
    }
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &AnalysisRequest) -> Result<AnalysisReply, DispatchError>;

    /// Whether replies come from a real analysis service
    fn is_live(&self) -> bool;
}

/// Decide whether the analysis backend counts as available.
///
/// A configured URL is trusted as-is unless probing is enabled, in which case
/// a failed probe falls back to demo mode.
pub async fn resolve_availability(backend: &BackendConfig) -> bool {
    match backend.url.as_deref() {
        None => false,
        Some(url) if backend.probe => probe(url, backend.probe_timeout()).await,
        Some(_) => true,
    }
}

/// Pick the dispatcher for this process.
///
/// Live HTTP dispatch needs a configured URL, `BACKEND_LIVE=true`, and an
/// available backend; everything else gets placeholder replies.
pub fn build_dispatcher(backend: &BackendConfig, backend_available: bool) -> Arc<dyn Dispatcher> {
    if let (Some(url), true, true) = (backend.url.as_deref(), backend.live, backend_available) {
        match HttpDispatcher::new(url, backend.timeout()) {
            Ok(dispatcher) => {
                info!(%url, "Using live analysis backend");
                return Arc::new(dispatcher);
            }
            Err(e) => warn!(
                "Failed to create analysis client, falling back to placeholders: {}",
                e
            ),
        }
    }

    info!(backend_available, "Using placeholder replies");
    Arc::new(PlaceholderDispatcher::new(backend_available))
}
