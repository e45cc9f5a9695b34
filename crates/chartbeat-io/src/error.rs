//! Error types for media and document I/O.

use std::path::PathBuf;

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for media extraction, decoding and persisted documents.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required upstream artifact does not exist
    #[error("Required input not found: {}", .0.display())]
    InputMissing(PathBuf),

    /// Document is larger than the read limit
    #[error("File too large: {size} bytes (limit: {limit} bytes)")]
    FileTooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        limit: u64,
    },

    /// The media tool could not be started or exited with an error
    #[error("Media tool failed: {0}")]
    MediaTool(String),

    /// WAV decoding failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// No track produced a usable drop window
    #[error("No usable drop window found in {0} tracks")]
    NoUsableWindow(usize),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    /// Whether the error means an upstream stage has not been run yet
    pub fn is_input_missing(&self) -> bool {
        matches!(self, IoError::InputMissing(_))
    }
}
