//! Error types for the chart controller and performances
use chartbeat_core::CoreError;
use chartbeat_io::IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Controller answered with a non-success status
    #[error("{method} {path} returned {status}")]
    Status {
        method: String,
        path: String,
        status: u16,
    },

    /// Health probe failed
    #[error("Controller not healthy: {0}")]
    Unhealthy(String),

    /// Controller has no open chart
    #[error("No charts found on the controller")]
    NoCharts,

    /// Chart bounds could not be determined
    #[error("Chart bounds unavailable: {0}")]
    Bounds(String),

    /// Timeline or configuration error from the core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Document or media error
    #[error(transparent)]
    Io(#[from] IoError),

    /// A required upstream artifact does not exist
    #[error("Required input not found: {}", .0.display())]
    InputMissing(PathBuf),

    /// Audio player could not be started or stopped
    #[error("Audio player error: {0}")]
    Player(String),
}

impl ControlError {
    /// Whether the error means an upstream stage has not been run yet
    pub fn is_input_missing(&self) -> bool {
        match self {
            ControlError::InputMissing(_) => true,
            ControlError::Io(e) => e.is_input_missing(),
            _ => false,
        }
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
