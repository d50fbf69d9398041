//! Ingestion Gate
//!
//! Accepts one file at a time, publishes its metadata, and produces the
//! preview for the file that was accepted last.
//!
//! Every request is stamped with a generation taken from the published view.
//! A preview that finishes after a newer file was accepted is dropped, so the
//! visible preview always belongs to the latest request, not the latest
//! completion.

pub mod source;

pub use source::{normalize_dropped_path, FileSource, InMemoryFile, LocalFile};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::models::{DatasetView, FileMeta, Notice, PreviewResult};
use crate::preview::{self, PreviewOptions};
use crate::types::IngestError;

/// Extensions offered by the file picker
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "parquet"];

pub const DEFERRED_NOTICE: &str = "Preview for Excel/Parquet will appear after backend processing.";
pub const FAILURE_NOTICE: &str = "Failed to generate preview.";

/// File classification by extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
    Parquet,
    Other(String),
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let extension = extension_of(name);
        match extension.as_str() {
            "csv" => FileKind::Csv,
            "xlsx" | "xls" => FileKind::Excel,
            "parquet" => FileKind::Parquet,
            _ => FileKind::Other(extension),
        }
    }

    /// Only CSV is previewed locally
    pub fn is_local(&self) -> bool {
        matches!(self, FileKind::Csv)
    }
}

/// Lowercased extension of a file name, "" when there is none
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_accepted(name: &str) -> bool {
    ACCEPTED_EXTENSIONS.contains(&extension_of(name).as_str())
}

/// Derive metadata: declared type first, then a guess from the extension
pub fn file_meta<F: FileSource + ?Sized>(file: &F) -> FileMeta {
    let mime_type = file
        .declared_type()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            mime_guess::from_path(file.name())
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    FileMeta {
        name: file.name().to_string(),
        mime_type,
        size_bytes: file.size_bytes(),
    }
}

#[derive(Clone)]
pub struct IngestionGate {
    view: Arc<watch::Sender<DatasetView>>,
    options: PreviewOptions,
}

impl IngestionGate {
    pub fn new(options: PreviewOptions) -> Self {
        let (view, _) = watch::channel(DatasetView::default());
        Self {
            view: Arc::new(view),
            options,
        }
    }

    /// Receiver for renderers and the conversation session
    pub fn subscribe(&self) -> watch::Receiver<DatasetView> {
        self.view.subscribe()
    }

    pub fn current(&self) -> DatasetView {
        self.view.borrow().clone()
    }

    /// Ingest one file. Never fails: problems end up as a notice on the view.
    pub async fn ingest<F: FileSource + ?Sized>(&self, file: &F) {
        let meta = file_meta(file);
        let kind = FileKind::from_name(&meta.name);
        let generation = self.accept(meta.clone());

        info!(
            file = %meta.name,
            mime_type = %meta.mime_type,
            size_bytes = meta.size_bytes,
            generation,
            "Accepted file"
        );

        if !kind.is_local() {
            let deferred = IngestError::UnsupportedLocalFormat {
                extension: extension_of(&meta.name),
            };
            info!(generation, "{}", deferred);
            let notice = match kind {
                FileKind::Other(ext) if !ext.is_empty() => Notice::info(format!(
                    "Preview for .{} files will appear after backend processing.",
                    ext
                )),
                _ => Notice::info(DEFERRED_NOTICE),
            };
            self.complete(generation, PreviewResult::empty(), Some(notice));
            return;
        }

        match self.read_preview(file).await {
            Ok(preview) => {
                debug!(
                    generation,
                    columns = preview.columns.len(),
                    rows = preview.rows.len(),
                    "Preview ready"
                );
                self.complete(generation, preview, None);
            }
            Err(e) => {
                error!(file = %meta.name, generation, "Failed to generate preview: {}", e);
                self.complete(
                    generation,
                    PreviewResult::empty(),
                    Some(Notice::error(FAILURE_NOTICE)),
                );
            }
        }
    }

    async fn read_preview<F: FileSource + ?Sized>(
        &self,
        file: &F,
    ) -> Result<PreviewResult, IngestError> {
        let bytes = file.read_bytes().await?;
        let mut text = String::from_utf8(bytes)?;
        if text.starts_with('\u{feff}') {
            text.drain(..'\u{feff}'.len_utf8());
        }
        Ok(preview::parse_with(&text, &self.options))
    }

    /// Replace the current file and preview, returning the new generation
    fn accept(&self, meta: FileMeta) -> u64 {
        let mut generation = 0;
        self.view.send_modify(|view| {
            generation = view.generation + 1;
            *view = DatasetView {
                file: Some(meta),
                preview: PreviewResult::empty(),
                busy: true,
                notice: None,
                generation,
            };
        });
        generation
    }

    /// Publish a result if its request is still the current one
    fn complete(&self, generation: u64, preview: PreviewResult, notice: Option<Notice>) -> bool {
        let applied = self.view.send_if_modified(|view| {
            if view.generation != generation {
                return false;
            }
            view.preview = preview;
            view.notice = notice;
            view.busy = false;
            true
        });

        if !applied {
            debug!(generation, "Discarding superseded preview");
        }
        applied
    }
}
