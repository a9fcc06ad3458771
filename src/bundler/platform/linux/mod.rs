//! Linux packagers.

pub mod snap;
