use colored::*;
use eyre::Result;
use std::path::PathBuf;

use grabbag::settings::display_value;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Paths => paths(),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "grabbag Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!();

            println!("{}:", "logging".cyan());
            println!("  time_zone: {}", config.logging.time_zone.as_deref().unwrap_or("local"));
            println!("  compact_stream: {}", config.logging.compact_stream);
            println!("  all_logs_file: {}", config.all_logs_file().display());
            match config.error_logs_file() {
                Some(path) => println!("  error_logs_file: {}", path.display()),
                None => println!("  error_logs_file: -"),
            }
            println!();

            let options = config.settings_options();
            println!("{}:", "settings".cyan());
            if let Some(dir) = &options.directory {
                println!("  file: {}", dir.join(&options.file_name).display());
            }
            println!("  hard_fetch: {}", options.hard_fetch);
            for (key, value) in &config.settings.defaults {
                println!("  default {}: {}", key, display_value(value));
            }
        }
    }

    Ok(())
}

fn paths() -> Result<()> {
    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    if let Ok(path) = std::env::var("GRABBAG_CONFIG") {
        candidates.push(("GRABBAG_CONFIG".to_string(), PathBuf::from(path)));
    }
    if let Ok(dir) = std::env::var("GRABBAG_DIR") {
        candidates.push(("GRABBAG_DIR".to_string(), PathBuf::from(dir).join("grabbag.yaml")));
    }
    if let Some(dir) = dirs::config_dir() {
        candidates.push(("user".to_string(), dir.join("grabbag").join("grabbag.yaml")));
    }
    candidates.push(("local".to_string(), PathBuf::from("grabbag.yaml")));

    for (source, path) in candidates {
        let marker = if path.exists() { "✓".green() } else { "-".dimmed() };
        println!("{} {:15} {}", marker, source, path.display());
    }
    Ok(())
}
