//! Logger module
//!
//! A logging system based on `tracing-subscriber` with console output,
//! color control, and optional JSON formatting.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Initialize the logger with the given configuration
///
/// Safe to call once per process; a second call returns an error from the
/// global subscriber registry.
pub fn init_logger(config: &LoggingConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()?;
    } else {
        let is_tty = std::io::stdout().is_terminal();
        let use_ansi = config.colored && is_tty;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?;
    }

    Ok(())
}
