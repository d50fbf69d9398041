// DataChat - upload a tabular dataset and converse about it

pub mod config;
pub mod models;
pub mod types;
pub mod preview;   // Bounded CSV previews
pub mod ingest;    // File acceptance and preview publication
pub mod dispatch;  // Placeholder replies and the remote analysis client
pub mod session;   // Serialized conversation transcript
pub mod tui;       // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use ingest::IngestionGate;
pub use models::{DatasetView, FileMeta, Message, PreviewResult, Role, SessionState};
pub use session::ConversationSession;
