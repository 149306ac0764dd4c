//! Error taxonomy for task building
//!
//! Build failures are typed so the caller can tell a bad configuration apart
//! from an unreadable batch file. An input that yields no tasks is not an
//! error; it is reported through an empty [`TaskBuildReport`].
//!
//! [`TaskBuildReport`]: crate::core::task_builder::TaskBuildReport

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error categories surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Configuration errors (invalid settings, missing parameters)
    Configuration,
    /// File system errors (permissions, missing files, IO)
    FileSystem,
    /// Parsing and format errors
    Parsing,
}

/// Fatal errors raised while building download tasks
#[derive(Debug, Error)]
pub enum TaskBuildError {
    #[error("Configuration error: {message}")]
    ConfigValidation {
        message: String,
        parameter: Option<String>,
    },

    #[error("Cannot read batch file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TaskBuildError {
    pub fn config(message: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidation { .. } => ErrorCategory::Configuration,
            Self::FileAccess { .. } => ErrorCategory::FileSystem,
        }
    }
}

/// Non-fatal problem with a single batch line
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchParseError {
    #[error("line {line_number}: url is empty")]
    EmptyUrl { line_number: usize },

    #[error("line {line_number}: no comma and not a supported media url: {content}")]
    UnsupportedLine { line_number: usize, content: String },
}

impl BatchParseError {
    pub fn line_number(&self) -> usize {
        match self {
            Self::EmptyUrl { line_number } | Self::UnsupportedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

/// Result type alias for task building
pub type BuildResult<T> = Result<T, TaskBuildError>;
