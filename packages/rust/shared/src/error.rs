//! Error types for planbot.
//!
//! Library crates use [`PlanbotError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all planbot operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanbotError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching sources or calling the LLM.
    #[error("network error: {0}")]
    Network(String),

    /// Document text extraction error.
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// LLM response could not be decoded as JSON.
    #[error("LLM response parse error: {0}")]
    LlmParse(String),

    /// LLM response was valid JSON but lacked the answer field.
    #[error("invalid LLM response: {0}")]
    LlmShape(String),

    /// Chat transport delivery error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PlanbotError>;

impl PlanbotError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PlanbotError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = PlanbotError::extraction("corrupt xref table");
        assert!(err.to_string().contains("corrupt xref table"));
    }
}
