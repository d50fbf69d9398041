// Error types

use std::time::Duration;

/// Failures while reading a file for local preview
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Local preview is not available for .{extension} files")]
    UnsupportedLocalFormat { extension: String },

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("File is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Failures talking to the remote analysis service
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Analysis service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Analysis service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Analysis service returned HTTP {0}")]
    Status(u16),

    #[error("Analysis service sent an unreadable reply: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a file: {0}")]
    NotAFile(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
