//! Error types for the choreography core
use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// Audio feature arrays do not line up
    #[error("Invalid features: {0}")]
    InvalidFeatures(String),

    /// Chart bounds cannot be used to resolve placeholders
    #[error("Invalid chart bounds: {0}")]
    InvalidBounds(String),

    /// A body carries a placeholder token the resolver does not know
    #[error("Unknown placeholder token: {0}")]
    UnknownPlaceholder(String),

    /// Unknown choreography style name
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Config value out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Config file could not be parsed
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
