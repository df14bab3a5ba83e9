//! Structured logging setup.
//!
//! The library itself only emits `tracing` events. Binaries (servers, clients, tools)
//! call [`init_logging`] once at startup to install a subscriber.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use tracing::info;

/// Install a global `tracing-subscriber` fmt subscriber configured from `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(config.show_target);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ProtocolError::ConfigError(format!("Failed to install logger: {e}")))?;

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}
