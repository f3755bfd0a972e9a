//! Error types for mood-harmony

use thiserror::Error;

/// Errors that can occur while loading data, configuring, or rendering
#[derive(Debug, Error)]
pub enum HarmonyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Sector out of range: {0} (expected 0-7)")]
    InvalidSector(u8),

    #[error("Unknown sector label: {0}")]
    UnknownSectorLabel(String),

    #[error("Invalid pointer event: {0}")]
    InvalidEvent(String),

    #[error("Rendering error: {0}")]
    RenderError(String),
}
