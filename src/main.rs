//! Flutter desktop bundler - package and run Rust applications with a Flutter front end.
//!
//! This binary compiles a Rust project, builds its asset bundle and packages
//! both (.app, .dmg, NSIS installer, snap), or runs it with hot reload attached.

use flutter_app_bundler::cli::{self, OutputManager};
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let exit_code = match cli::run().await {
        Ok(()) => 0,
        Err(e) => {
            log::debug!("{e:?}");
            let _ = OutputManager::new(false).error(&format!("Error: {e}"));
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
