use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_NOTIFICATION_MS: u64 = 3000;
const DEFAULT_TICK_MS: u64 = 100;
const LOG_FILE_NAME: &str = "osintdash.log";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub layout: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub notification_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub tick_ms: Option<u64>,
}

impl FileConfig {
    /// Load `path`. A missing file is an empty config; a broken one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub layout: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub notification_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub layout: PathBuf,
    pub export_dir: PathBuf,
    pub notification_duration: Duration,
    pub log_file: PathBuf,
    pub tick_rate: Duration,
}

/// Default location of the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("osintdash").join("config.toml"))
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("osintdash"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

/// Resolve settings from CLI flags > env vars > config file > defaults.
///
/// `env` looks up an environment variable by name.
pub fn resolve<F>(cli: CliOverrides, env: F, file: FileConfig) -> anyhow::Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let layout = cli
        .layout
        .or_else(|| env("OSINTDASH_LAYOUT").map(PathBuf::from))
        .or(file.layout)
        .context("No layout given; pass a layout file or set OSINTDASH_LAYOUT")?;

    let export_dir = cli
        .export_dir
        .or_else(|| env("OSINTDASH_EXPORT_DIR").map(PathBuf::from))
        .or(file.export_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let notification_ms = match cli.notification_ms {
        Some(ms) => ms,
        None => match env("OSINTDASH_NOTIFICATION_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("OSINTDASH_NOTIFICATION_MS is not a number: {raw:?}"))?,
            None => file.notification_ms.unwrap_or(DEFAULT_NOTIFICATION_MS),
        },
    };

    let log_file = cli
        .log_file
        .or_else(|| env("OSINTDASH_LOG_FILE").map(PathBuf::from))
        .or(file.log_file)
        .unwrap_or_else(default_log_file);

    let tick_ms = file.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(10);

    Ok(Settings {
        layout,
        export_dir,
        notification_duration: Duration::from_millis(notification_ms),
        log_file,
        tick_rate: Duration::from_millis(tick_ms),
    })
}
