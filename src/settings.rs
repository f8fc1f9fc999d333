//! JSON settings file with defaults
//!
//! The file is created from the defaults when missing, replaced by them when
//! it is not a JSON object, and topped up with any default key it lacks.

use eyre::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "settings.json";

pub type SettingsMap = BTreeMap<String, Value>;

/// Where and how settings are stored
#[derive(Debug, Clone)]
pub struct SettingsOptions {
    /// Directory of the settings file (current directory when `None`)
    pub directory: Option<PathBuf>,
    pub file_name: String,
    /// Re-read the file before every `get`, `all` and `update`, so edits made
    /// on disk win over what is held in memory
    pub hard_fetch: bool,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            hard_fetch: false,
        }
    }
}

/// Application settings backed by a JSON file
#[derive(Debug)]
pub struct Settings {
    defaults: SettingsMap,
    path: PathBuf,
    hard_fetch: bool,
    values: SettingsMap,
}

impl Settings {
    pub fn open(defaults: SettingsMap, options: SettingsOptions) -> Result<Self> {
        let directory = match options.directory {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to resolve current directory")?,
        };
        let path = directory.join(&options.file_name);

        let mut settings = Self {
            defaults,
            path,
            hard_fetch: options.hard_fetch,
            values: SettingsMap::new(),
        };
        settings.values = settings.load()?;
        Ok(settings)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn defaults(&self) -> &SettingsMap {
        &self.defaults
    }

    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        self.refresh()?;
        Ok(self.values.get(key).cloned())
    }

    pub fn all(&mut self) -> Result<&SettingsMap> {
        self.refresh()?;
        Ok(&self.values)
    }

    /// Set `key` and persist the whole map
    pub fn update(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.refresh()?;
        self.values.insert(key.to_string(), value.into());
        save(&self.path, &self.values)
    }

    /// Overwrite the file with the defaults
    pub fn reset(&mut self) -> Result<()> {
        self.values = self.defaults.clone();
        save(&self.path, &self.values)
    }

    fn refresh(&mut self) -> Result<()> {
        if self.hard_fetch {
            self.values = self.load()?;
        }
        Ok(())
    }

    fn load(&self) -> Result<SettingsMap> {
        if !self.path.is_file() {
            log::info!("Settings file {} not found, writing defaults", self.path.display());
            save(&self.path, &self.defaults)?;
            return Ok(self.defaults.clone());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file {}", self.path.display()))?;

        let mut values: SettingsMap = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Corrupt settings file {} ({}), restoring defaults", self.path.display(), e);
                save(&self.path, &self.defaults)?;
                return Ok(self.defaults.clone());
            }
        };

        let mut filled = false;
        for (key, value) in &self.defaults {
            if !values.contains_key(key) {
                values.insert(key.clone(), value.clone());
                filled = true;
            }
        }
        if filled {
            save(&self.path, &values)?;
        }

        Ok(values)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return write!(f, "No settings available");
        }

        write!(f, "Current settings:")?;
        for (key, value) in &self.values {
            write!(f, "\n• {:20} : {}", key, display_value(value))?;
        }
        Ok(())
    }
}

/// Strings without quotes, everything else as compact JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pretty-print with four-space indentation; keys come out sorted
fn save(path: &Path, values: &SettingsMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create settings directory")?;
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    values.serialize(&mut ser).context("Failed to serialize settings")?;

    fs::write(path, out).with_context(|| format!("Failed to write settings file {}", path.display()))?;
    Ok(())
}
