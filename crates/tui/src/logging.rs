use std::{fs::OpenOptions, sync::Mutex};

use crate::{config::AppConfig, error::Result};

/// Sends `tracing` output to the configured log file; the terminal belongs
/// to the UI.
pub fn init(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fraudwatch_tui={level},client={level},engine={level}",
            level = config.log_level
        ))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
