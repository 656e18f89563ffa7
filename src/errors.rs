/*!
 * Error types for the subprep application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing subtitle documents
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The input document is missing or unreadable
    #[error("Failed to read subtitle document {path:?}: {source}")]
    Read {
        /// Path of the document
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The bookmark file could not be written
    #[error("Failed to write bookmark file {path:?}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors raised by the external tools wrapped in the `media` and `fonts` modules
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be started
    #[error("Failed to execute {tool}: {source}")]
    Spawn {
        /// Tool binary name
        tool: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The tool ran but reported failure
    #[error("{tool} failed with exit code {code:?}: {stderr}")]
    Failed {
        /// Tool binary name
        tool: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Filtered standard error output
        stderr: String,
    },

    /// The tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Tool binary name
        tool: String,
        /// Timeout that was exceeded
        secs: u64,
    },

    /// The tool output could not be interpreted
    #[error("Unexpected output from {tool}: {message}")]
    InvalidOutput {
        /// Tool binary name
        tool: String,
        /// What went wrong
        message: String,
    },
}

/// Errors that can occur while managing fonts
#[derive(Error, Debug)]
pub enum FontError {
    /// No per-user font directory is known for this platform
    #[error("No font directory available; set fonts.font_dir in the configuration")]
    NoFontDirectory,

    /// A font file operation failed
    #[error("Font file operation failed for {path:?}: {source}")]
    Io {
        /// Path involved in the operation
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A font tool failed
    #[error("Font tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Error from font management
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
