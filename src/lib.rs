//! Build, package and run Rust desktop applications with a Flutter front end.
//!
//! This library provides:
//! - environment derivation from a project's `Cargo.toml`
//! - packaging as a macOS `.app`, a `.dmg`, an NSIS installer or a snap
//! - a development loop that attaches the hot-reload client to a running app
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod dev;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
