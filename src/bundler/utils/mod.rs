//! Shared helpers for packagers and the orchestrator.

pub mod fs;
pub mod process;
