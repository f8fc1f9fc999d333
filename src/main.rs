use clap::Parser;
use eyre::{Context, Result};
use log::info;

use grabbag::logging::{CustomLogging, LoggingHandle};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::Config;

fn setup_logging(cli: &Cli, config: &Config) -> Result<LoggingHandle> {
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        config.log_level.level_filter()
    };

    // RUST_LOG env var takes precedence over the configured stream level
    let mut logging = CustomLogging::new()
        .level(level)
        .time_zone(config.time_zone()?)
        .compact_stream(config.logging.compact_stream)
        .all_logs_file(config.all_logs_file());
    if let Some(path) = config.error_logs_file() {
        logging = logging.error_logs_file(path);
    }
    if let Some(msg) = &config.logging.initial_message {
        logging = logging.initial_message(msg);
    }

    let handle = logging.init()?;

    info!("Logging initialized, writing to: {:?}", handle.file_paths());
    info!(
        "Log level: {} (from {})",
        level,
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(handle)
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Log { action } => commands::log::run(action, &config),
        Commands::Text { action } => commands::text::run(action),
        Commands::Files { action } => commands::files::run(action),
        Commands::Fonts { filter, grouped } => commands::fonts::run(filter.as_deref(), grouped),
        Commands::Tasks { exe } => commands::tasks::run(exe.as_deref()),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let logging = setup_logging(&cli, &config).context("Failed to setup logging")?;

    info!("Starting grabbag with config from: {:?}", cli.config);

    let result = run(cli, config).context("Command failed");
    logging.close();
    result
}
