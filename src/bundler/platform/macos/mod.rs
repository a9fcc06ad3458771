//! macOS packagers.

pub mod app;
pub mod dmg;
