//! Bundle orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that sequences the
//! compile, asset-bundle and packaging stages for one [`PackageType`].
//!
//! # Module Organization
//!
//! - `checksum` - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct and the [`Toolchain`] it drives
//! - [`tool_detection`] - External tool lookup
//!
//! [`PackageType`]: crate::bundler::PackageType

pub(crate) mod checksum;
pub mod orchestrator;
pub mod tool_detection;

pub use orchestrator::{Bundler, Toolchain, asset_bundle_command};
