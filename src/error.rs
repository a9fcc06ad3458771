//! Top-level error type of the command line tool.
//!
//! Wraps library errors together with the failures that only exist at the
//! CLI boundary, and maps each of them to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// `--project-dir` does not name a directory
    #[error("Project directory does not exist: {}", .path.display())]
    MissingProjectDir {
        /// Directory that was given
        path: PathBuf,
    },
}

impl BundlerError {
    /// Process exit code for this error.
    ///
    /// A failing external tool's own non-zero exit code is passed through.
    /// Everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Bundler(e) => e.tool_exit_code().filter(|code| *code != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
