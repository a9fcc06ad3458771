//! Packaging pipeline for toolkit desktop applications.
//!
//! Derives an [`Environment`] from a project manifest, then compiles the
//! project, builds its asset bundle and packages both with one of the
//! [`PackageType`] strategies.

pub mod builder;
pub mod environment;
pub mod error;
pub mod platform;
pub mod template;
pub mod utils;

pub use builder::{Bundler, Toolchain};
pub use environment::{BuildFlags, Environment, Profile, ToolkitOverrides};
pub use error::{Error, Result};
pub use platform::{Artifact, PackageType};
