use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;
use clap::Parser;
use engine::Dialect;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/fraudwatch.toml";
const ENV_PREFIX: &str = "FRAUDWATCH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub poll_secs: u64,
    pub dialect: Dialect,
    /// IANA name; unknown names fall back to UTC.
    pub timezone: String,
    pub alerts: bool,
    pub live: bool,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: client::DEFAULT_BASE_URL.to_string(),
            timeout_secs: client::DEFAULT_TIMEOUT.as_secs(),
            poll_secs: 10,
            dialect: Dialect::Standard,
            timezone: "UTC".to_string(),
            alerts: true,
            live: true,
            export_dir: PathBuf::from("."),
            log_file: PathBuf::from("fraudwatch_tui.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs.max(1))
    }

    pub fn tz(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(err) => {
                tracing::warn!(timezone = %self.timezone, "unknown time zone, using UTC: {err}");
                Tz::UTC
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fraudwatch_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override backend base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Override display time zone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Approval-status vocabulary of the backend: standard or legacy.
    #[arg(long, value_parser = parse_dialect)]
    dialect: Option<Dialect>,
    /// Auto-refresh interval in seconds.
    #[arg(long)]
    poll_secs: Option<u64>,
    /// Directory CSV reports are written to.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_dialect(raw: &str) -> std::result::Result<Dialect, String> {
    Dialect::parse(raw).ok_or_else(|| format!("unknown dialect `{raw}`, expected standard or legacy"))
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(dialect) = args.dialect {
        settings.dialect = dialect;
    }
    if let Some(poll_secs) = args.poll_secs {
        settings.poll_secs = poll_secs;
    }
    if let Some(export_dir) = args.export_dir {
        settings.export_dir = export_dir;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}
