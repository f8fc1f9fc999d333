use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "grabbag",
    about = "Grab bag of small utilities: settings files, log formatting, text and file helpers",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/grabbag/logs/grabbag.log ($GRABBAG_DIR/logs when set)"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to grabbag.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and change the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Format log records
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Text helpers
    Text {
        #[command(subcommand)]
        action: TextAction,
    },

    /// File helpers
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// List installed fonts
    Fonts {
        /// Only fonts whose name contains this text (case-insensitive)
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Group similar names together
        #[arg(long)]
        grouped: bool,
    },

    /// Show running tasks (Windows only)
    Tasks {
        /// Only report whether this executable is running
        #[arg(long)]
        exe: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show every setting
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print one setting
    Get {
        key: String,
    },

    /// Change one setting (value parsed as JSON, else taken as text)
    Set {
        key: String,
        value: String,
    },

    /// Restore the defaults
    Reset,

    /// Print the settings file path
    Path,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Format JSON-lines log records read from stdin
    Format {
        /// Use the full layout for every level
        #[arg(long)]
        full: bool,

        /// Time zone for timestamps, e.g. Asia/Kolkata or +05:30 (defaults to the config)
        #[arg(long)]
        time_zone: Option<String>,

        /// Per-level template override, e.g. info="{level}: {msg}"
        #[arg(long = "template", short = 't', value_name = "LEVEL=TEMPLATE")]
        templates: Vec<String>,

        /// strftime format for {time}
        #[arg(long)]
        date_format: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TextAction {
    /// Human readable byte size
    Bytes {
        size: f64,
    },

    /// Append punctuation when missing
    Punctuate {
        text: String,

        #[arg(long, short = 'p', default_value = ".")]
        punc: String,
    },

    /// Collapse extra whitespace
    Spaces {
        text: String,
    },

    /// Replace HTML tags
    StripHtml {
        text: String,

        /// Replacement for each removed tag
        #[arg(long, default_value = "")]
        repl: String,

        /// Tags to keep
        #[arg(long = "keep", short = 'k')]
        keep: Vec<String>,
    },

    /// Make text safe to use as a file name
    Sanitize {
        text: String,
    },
}

#[derive(Subcommand)]
pub enum FilesAction {
    /// Print the first free variant of a path
    NewPath {
        path: PathBuf,

        /// Rename existing directories too
        #[arg(long)]
        dirs: bool,
    },

    /// Print a random unused file path
    RandomPath {
        /// Directory (defaults to the temp directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long, short = 'e', default_value = "")]
        extension: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the config file search locations
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_format() {
        let cli = Cli::parse_from(["grabbag", "log", "format", "--full", "-t", "info={msg}", "-t", "error=!{msg}"]);
        match cli.command {
            Commands::Log {
                action: LogAction::Format { full, templates, .. },
            } => {
                assert!(full);
                assert_eq!(templates, vec!["info={msg}", "error=!{msg}"]);
            }
            _ => panic!("expected log format"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["grabbag", "text", "bytes", "2048", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Text { action: TextAction::Bytes { .. } }));
    }
}
