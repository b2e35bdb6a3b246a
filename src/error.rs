//! Error types and handling infrastructure for compressed-source.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type. The `ccat` binary layers `anyhow` on top for context.
//!
//! ## Error Categories
//!
//! - **Configuration**: invalid source setup, rejected sub-ranges, unreadable options files
//! - **I/O and codec**: channel failures and malformed compressed headers or bodies
//! - **Programming errors**: unsupported strategy entry points, reader lifecycle misuse
//! - **Iteration**: asking for a record when there is none

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for compressed-source operations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// I/O failures, including codec errors surfaced while opening a decompressing channel
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A concrete file spec that does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A source failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// An argument was rejected, e.g. a sub-range that does not start at offset 0
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An entry point the receiver does not support
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// No current record is available
    #[error("No such element: {message}")]
    NoSuchElement { message: String },

    /// A reader was used outside its lifecycle
    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    /// Options file could not be loaded
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Standard Result type for compressed-source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

impl SourceError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::NoSuchElement {
            message: message.into(),
        }
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// True for errors that indicate a misconfigured source rather than bad data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::InvalidArgument { .. }
        )
    }
}

// Automatic conversion from io::Error to SourceError
impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                "Malformed input"
            }
            _ => "IO operation failed",
        };
        Self::FileError {
            message: message.to_string(),
            source: err,
        }
    }
}
