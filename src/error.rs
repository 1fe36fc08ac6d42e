//! Custom error types for papertracker.
//!
//! Source adapters never surface these to the pipeline caller: a failed fetch
//! is logged and turned into an empty result at the adapter boundary. The
//! variants below are for the fallible paths behind that boundary and for
//! configuration and export.

use thiserror::Error;

/// Main error type for papertracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response payload did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// External API returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from API
        code: u16,
        /// Error message from API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Catalog file could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `TrackerError`
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| TrackerError::Parse(msg.to_string()))
    }
}
