//! Error types for bundling operations.
//!
//! Every failure aborts the current invocation. There is no retry and no
//! partial-success state, so each variant carries enough context to report
//! the failing stage and its cause.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How an external tool failed.
#[derive(Debug)]
pub enum ToolFailure {
    /// The executable could not be located on the search path.
    NotFound,
    /// The executable was found but could not be started.
    Spawn(std::io::Error),
    /// The process ran and exited unsuccessfully.
    ///
    /// `None` means it was terminated by a signal.
    ExitStatus(Option<i32>),
}

impl Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found on the search path"),
            Self::Spawn(e) => write!(f, "failed to start: {e}"),
            Self::ExitStatus(Some(code)) => write!(f, "exited with status {code}"),
            Self::ExitStatus(None) => f.write_str("terminated by signal"),
        }
    }
}

/// Errors raised while deriving the environment, packaging, or running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest is missing, unparsable, or lacks a required field.
    #[error("manifest error in {}: {reason}", .path.display())]
    Manifest {
        /// Manifest that was being read.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// No manifest was found walking upward to the filesystem root.
    #[error("could not find {file_name} in {} or any parent directory", .start.display())]
    PathResolution {
        /// Directory the search started from.
        start: PathBuf,
        /// Manifest file name that was searched for.
        file_name: &'static str,
    },

    /// An input expected by a packaging stage is absent.
    #[error("missing prerequisite for {stage}: {what} ({})", .path.display())]
    PrerequisiteMissing {
        /// Stage that needed the input.
        stage: &'static str,
        /// Human readable name of the input.
        what: String,
        /// Where it was expected.
        path: PathBuf,
    },

    /// An external tool could not be run or exited non-zero.
    #[error("`{tool}` {failure}")]
    ExternalTool {
        /// Tool name as invoked.
        tool: String,
        /// Failure detail.
        failure: ToolFailure,
    },

    /// A bounded wait expired.
    #[error("timed out after {}s waiting for {what}", .after.as_secs())]
    Timeout {
        /// What was being waited on.
        what: String,
        /// Deadline that expired.
        after: Duration,
    },

    /// A supervised process ended before producing what was expected of it.
    #[error("`{command}` exited before {expected} (status: {})", display_code(.code))]
    ProcessExited {
        /// Command that ended.
        command: String,
        /// What it never produced.
        expected: String,
        /// Exit code, when it could be collected.
        code: Option<i32>,
    },

    /// A packaging target outside the supported set.
    #[error("unknown package type `{0}` (expected one of: mac, dmg, nsis, snap)")]
    UnknownPackageType(String),

    /// Template registration or rendering failed.
    #[error("template `{name}`: {reason}")]
    Template {
        /// Template name.
        name: &'static str,
        /// Renderer message.
        reason: String,
    },

    /// I/O error with the path it happened on.
    #[error("{context} ({}): {source}", .path.display())]
    Fs {
        /// Operation that was being performed.
        context: String,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Plain I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("directory walk failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix error while mirroring directory trees.
    #[error("path prefix error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

impl Error {
    /// Exit code of the failing external tool, when there is one.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::ExternalTool {
                failure: ToolFailure::ExitStatus(code),
                ..
            } => *code,
            Self::ProcessExited { code, .. } => *code,
            _ => None,
        }
    }

    /// Shorthand for a missing prerequisite.
    pub fn missing(stage: &'static str, what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::PrerequisiteMissing {
            stage,
            what: what.into(),
            path: path.into(),
        }
    }
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error with an operation description and the path involved.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Converts `Option`s and foreign errors into [`Error::GenericError`] with a message.
pub trait Context<T> {
    /// Adds a static message.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Adds a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_taken_from_failed_tool() {
        let err = Error::ExternalTool {
            tool: "cargo".into(),
            failure: ToolFailure::ExitStatus(Some(101)),
        };
        assert_eq!(err.tool_exit_code(), Some(101));
        assert_eq!(err.to_string(), "`cargo` exited with status 101");

        let err = Error::ExternalTool {
            tool: "makensis".into(),
            failure: ToolFailure::NotFound,
        };
        assert_eq!(err.tool_exit_code(), None);
    }

    #[test]
    fn fs_context_keeps_the_path() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        let err = res.fs_context("reading icon", "/tmp/icon.icns").unwrap_err();
        match err {
            Error::Fs { context, path, .. } => {
                assert_eq!(context, "reading icon");
                assert_eq!(path, PathBuf::from("/tmp/icon.icns"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
