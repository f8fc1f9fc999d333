use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use grabbag::logging::Zone;
use grabbag::settings::SettingsOptions;

/// Verbosity of the terminal log stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Main grabbag configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub logging: LoggingConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Zone name such as `Asia/Kolkata` or an offset such as `+05:30`;
    /// timestamps use local time when unset
    pub time_zone: Option<String>,
    /// Compact layout on the terminal stream
    pub compact_stream: bool,
    /// Info-and-above log file (defaults to the grabbag log directory)
    pub all_logs_file: Option<PathBuf>,
    /// Error-and-above log file
    pub error_logs_file: Option<PathBuf>,
    pub initial_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Directory of the settings file (defaults to the grabbag directory)
    pub directory: Option<PathBuf>,
    pub file_name: String,
    pub hard_fetch: bool,
    pub defaults: BTreeMap<String, serde_json::Value>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            time_zone: None,
            compact_stream: true,
            all_logs_file: None,
            error_logs_file: None,
            initial_message: None,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: grabbag::settings::DEFAULT_FILE_NAME.to_string(),
            hard_fetch: false,
            defaults: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check GRABBAG_CONFIG env var
        if let Ok(env_path) = std::env::var("GRABBAG_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from GRABBAG_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try GRABBAG_DIR/grabbag.yaml
        if let Ok(dir) = std::env::var("GRABBAG_DIR") {
            let path = PathBuf::from(dir).join("grabbag.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from GRABBAG_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/grabbag/grabbag.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("grabbag").join("grabbag.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./grabbag.yaml (for development)
        let local_config = PathBuf::from("grabbag.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the grabbag directory (settings and, when set by env, logs)
    pub fn grabbag_dir() -> PathBuf {
        std::env::var("GRABBAG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("grabbag"))
    }

    /// Directory the default log file lives in
    pub fn log_dir() -> PathBuf {
        match std::env::var("GRABBAG_DIR") {
            Ok(dir) => PathBuf::from(dir).join("logs"),
            Err(_) => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("grabbag")
                .join("logs"),
        }
    }

    pub fn all_logs_file(&self) -> PathBuf {
        match &self.logging.all_logs_file {
            Some(path) => Self::expand_path(path),
            None => Self::log_dir().join("grabbag.log"),
        }
    }

    pub fn error_logs_file(&self) -> Option<PathBuf> {
        self.logging.error_logs_file.as_deref().map(Self::expand_path)
    }

    /// Parsed `logging.time_zone`
    pub fn time_zone(&self) -> Result<Option<Zone>> {
        self.logging
            .time_zone
            .as_deref()
            .map(|tz| Zone::parse(tz).context(format!("Invalid time_zone {:?}", tz)))
            .transpose()
    }

    pub fn settings_options(&self) -> SettingsOptions {
        SettingsOptions {
            directory: Some(match &self.settings.directory {
                Some(dir) => Self::expand_path(dir),
                None => Self::grabbag_dir(),
            }),
            file_name: self.settings.file_name.clone(),
            hard_fetch: self.settings.hard_fetch,
        }
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
