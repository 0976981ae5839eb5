//! retrobridge - keyboard and display front end for an emulation backend
//!
//! Main entry point for the desktop application.

use rb_core::{logging, Config};
use rb_ui::app;

fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config ({err}), using defaults");
            Config::default()
        }
    };

    // Initialize logging
    logging::init(config.debug.log_level);

    tracing::info!(path = %Config::config_path().display(), "Starting retrobridge");

    // Run the application
    app::run(config).map_err(|err| anyhow::anyhow!("UI failed: {err}"))
}
