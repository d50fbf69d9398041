// File sources accepted by the ingestion gate

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::types::{AppError, AppResult, IngestError};

/// A selected or dropped file
#[async_trait]
pub trait FileSource: Send + Sync {
    /// File name including extension, without directories
    fn name(&self) -> &str;

    /// MIME type declared by whoever handed us the file, if any
    fn declared_type(&self) -> Option<&str> {
        None
    }

    fn size_bytes(&self) -> u64;

    /// Read the full content
    async fn read_bytes(&self) -> Result<Vec<u8>, IngestError>;
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size_bytes: u64,
}

impl LocalFile {
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(AppError::NotAFile(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::NotAFile(path.display().to_string()))?;

        Ok(Self {
            path,
            name,
            size_bytes: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, IngestError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// A file whose content is already in memory (uploads, tests)
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    mime_type: Option<String>,
    content: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[async_trait]
impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, IngestError> {
        Ok(self.content.clone())
    }
}

/// Clean up a path pasted into the terminal by a drag-and-drop.
///
/// Terminals hand drops over as text: possibly quoted, possibly a `file://`
/// URL, sometimes with a trailing newline.
pub fn normalize_dropped_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let path = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    // Shells escape spaces in dropped paths
    let path = path.replace("\\ ", " ");

    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_local_file_metadata_and_read() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a,b\n1,2\n").unwrap();

        let local = LocalFile::open(file.path()).await.unwrap();
        assert_eq!(local.size_bytes(), 8);
        assert!(local.declared_type().is_none());
        assert_eq!(local.read_bytes().await.unwrap(), b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_local_file_rejects_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = LocalFile::open(dir.path()).await;
        assert!(matches!(result, Err(AppError::NotAFile(_))));
    }

    #[test]
    fn test_in_memory_file() {
        let file =
            InMemoryFile::new("report.xlsx", vec![0u8; 16]).with_type("application/vnd.ms-excel");
        assert_eq!(file.name(), "report.xlsx");
        assert_eq!(file.size_bytes(), 16);
        assert_eq!(file.declared_type(), Some("application/vnd.ms-excel"));
    }

    #[test]
    fn test_normalize_dropped_path() {
        assert_eq!(
            normalize_dropped_path("'/tmp/my data.csv'\n"),
            Some(PathBuf::from("/tmp/my data.csv"))
        );
        assert_eq!(
            normalize_dropped_path("file:///tmp/sales.csv"),
            Some(PathBuf::from("/tmp/sales.csv"))
        );
        assert_eq!(
            normalize_dropped_path("/tmp/my\\ data.csv"),
            Some(PathBuf::from("/tmp/my data.csv"))
        );
        assert_eq!(normalize_dropped_path("   "), None);
    }
}
