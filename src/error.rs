// src/error.rs

//! Unified error handling for the harvester.

use std::fmt;

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote source answered with a failure status or was unreachable
    #[error("Source unavailable at page {page}: {message}")]
    SourceUnavailable { page: u32, message: String },

    /// Durable corpus write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A single scraped record lacked a required field
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Another synchronization cycle holds the writer slot
    #[error("A synchronization cycle is already running")]
    SyncInProgress,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a source failure for the given page.
    pub fn source_unavailable(page: u32, message: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            page,
            message: message.to_string(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }

    /// Create a malformed record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the failure only affects the current cycle.
    ///
    /// The scheduler keeps running after any error; this only picks the
    /// log level used at the boundary.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::Http(_) | Self::SyncInProgress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message() {
        let err = AppError::source_unavailable(3, "HTTP 503");
        assert_eq!(err.to_string(), "Source unavailable at page 3: HTTP 503");
        assert!(err.is_transient());
    }

    #[test]
    fn test_persistence_is_not_transient() {
        let err = AppError::persistence("disk full");
        assert!(!err.is_transient());
    }
}
