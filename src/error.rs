use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read image {0}: {1}")]
    UnreadableImage(PathBuf, String),

    #[error("Degenerate image {0}: {1}x{2}")]
    DegenerateImage(PathBuf, u32, u32),

    #[error("Failed to write compressed output {0}: {1}")]
    EncodeFailure(PathBuf, String),

    #[error("Failed to set up working directory {0}: {1}")]
    DirectorySetupFailure(PathBuf, String),

    #[error("Failed to write archive {0}: {1}")]
    ArchiveWriteFailure(PathBuf, String),

    #[error("No image files found in: {0}")]
    NoImageFilesFound(PathBuf),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid max dimension: {0}. Must be greater than 0")]
    InvalidMaxDimension(u32),

    #[error("Invalid compression settings: {0}")]
    InvalidSettings(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompressionError {
    /// Whether this error aborts a whole batch rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompressionError::DirectorySetupFailure(..)
                | CompressionError::ArchiveWriteFailure(..)
                | CompressionError::NoImageFilesFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
