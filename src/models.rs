// Core models shared by ingestion, the conversation session and rendering

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of data rows kept in a preview
pub const MAX_PREVIEW_ROWS: usize = 5;

/// Metadata of the currently accepted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// One preview row, keyed by column name
pub type Record = HashMap<String, String>;

/// Bounded tabular preview: header plus at most `MAX_PREVIEW_ROWS` rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl PreviewResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing to show (no-preview-yet)
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Cell lookup used by renderers; absent cells render as ""
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A transcript entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Conversation state as seen by renderers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub transcript: Vec<Message>,
    pub pending: bool,
}

/// Session phase derived from `pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Sending,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.pending {
            SessionPhase::Sending
        } else {
            SessionPhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-fatal message surfaced next to the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Everything the ingestion gate publishes about the current dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetView {
    pub file: Option<FileMeta>,
    pub preview: PreviewResult,
    pub busy: bool,
    pub notice: Option<Notice>,
    pub generation: u64,
}

impl DatasetView {
    pub fn has_data(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_meta_serializes_camel_case() {
        let meta = FileMeta {
            name: "sales.csv".to_string(),
            mime_type: "text/csv".to_string(),
            size_bytes: 2048,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["mimeType"], "text/csv");
        assert_eq!(json["sizeBytes"], 2048);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("hello");
        let b = Message::user("hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
    }

    #[test]
    fn test_cell_lookup_defaults_to_empty() {
        let preview = PreviewResult::empty();
        assert_eq!(preview.cell(3, "missing"), "");
        assert!(preview.is_empty());
    }

    #[test]
    fn test_phase_follows_pending() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Idle);
        state.pending = true;
        assert_eq!(state.phase(), SessionPhase::Sending);
    }
}
