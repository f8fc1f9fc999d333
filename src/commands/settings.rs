use colored::*;
use eyre::{Context, Result};
use serde_json::Value;

use grabbag::settings::{Settings, display_value};
use grabbag::signal::{Signal, listener};

use crate::cli::{OutputFormat, SettingsAction};
use crate::config::Config;

/// Payload of the "Setting Changed" signal
#[derive(Debug, Clone)]
pub struct SettingChange {
    pub key: String,
    pub old: Option<Value>,
    pub new: Value,
}

pub fn run(action: SettingsAction, config: &Config) -> Result<()> {
    let mut settings = Settings::open(config.settings.defaults.clone(), config.settings_options())
        .context("Failed to open settings")?;

    match action {
        SettingsAction::Show { format } => show(OutputFormat::resolve(format), &mut settings),
        SettingsAction::Get { key } => get(&key, &mut settings),
        SettingsAction::Set { key, value } => set(&key, &value, &mut settings),
        SettingsAction::Reset => {
            settings.reset()?;
            println!("{} Settings reset to defaults", "✓".green());
            Ok(())
        }
        SettingsAction::Path => {
            println!("{}", settings.path().display());
            Ok(())
        }
    }
}

fn show(format: OutputFormat, settings: &mut Settings) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(settings.all()?)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(settings.all()?)?);
        }
        OutputFormat::Text => {
            settings.all()?;
            println!("{}", settings);
        }
    }
    Ok(())
}

fn get(key: &str, settings: &mut Settings) -> Result<()> {
    match settings.get(key)? {
        Some(value) => println!("{}", display_value(&value)),
        None => {
            eprintln!("{} Unknown setting: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn set(key: &str, raw: &str, settings: &mut Settings) -> Result<()> {
    let value = parse_value(raw);
    let old = settings.get(key)?;
    settings.update(key, value.clone())?;

    change_signal()?.emit(SettingChange {
        key: key.to_string(),
        old,
        new: value,
    })?;
    Ok(())
}

/// Listeners notified after a setting is written
fn change_signal() -> Result<Signal<SettingChange>> {
    let mut signal = Signal::new("Setting Changed");
    signal.connect(listener("log change", |change: &SettingChange| {
        log::info!(
            "Setting {} changed from {:?} to {}",
            change.key,
            change.old.as_ref().map(display_value),
            display_value(&change.new)
        );
    }))?;
    signal.connect(listener("report change", |change: &SettingChange| {
        println!(
            "{} Set {} = {}",
            "✓".green(),
            change.key.cyan(),
            display_value(&change.new).green()
        );
    }))?;
    Ok(signal)
}

/// JSON when it parses, plain text otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
