//! Windows packagers.

pub mod nsis;
