//! Logger installation: a terminal stream plus optional rotated log files
//!
//! ```text
//! log::info!(..) ──► LogDispatcher ──┬─► env_logger (stderr, compact)
//!                                    ├─► all-logs file   (>= Info, full)
//!                                    └─► error-logs file (>= Error, full)
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eyre::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};

use super::formatter::LevelFormatter;
use super::record::LogRecord;
use super::rotate::RotatingFile;
use super::zone::Zone;

/// Builder for the process-wide logger
pub struct CustomLogging {
    level: LevelFilter,
    respect_env: bool,
    time_zone: Option<Zone>,
    compact_stream: bool,
    stream_target: Option<env_logger::Target>,
    all_logs_file: Option<PathBuf>,
    error_logs_file: Option<PathBuf>,
    initial_message: Option<String>,
}

impl Default for CustomLogging {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            respect_env: true,
            time_zone: None,
            compact_stream: true,
            stream_target: None,
            all_logs_file: None,
            error_logs_file: None,
            initial_message: None,
        }
    }
}

impl CustomLogging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Let `RUST_LOG` override the stream filter (on by default)
    pub fn respect_env(mut self, respect: bool) -> Self {
        self.respect_env = respect;
        self
    }

    pub fn time_zone(mut self, zone: Option<Zone>) -> Self {
        self.time_zone = zone;
        self
    }

    /// Use the compact layout on the stream (otherwise the full layout)
    pub fn compact_stream(mut self, compact: bool) -> Self {
        self.compact_stream = compact;
        self
    }

    /// Where stream output goes (stderr by default)
    pub fn stream_target(mut self, target: env_logger::Target) -> Self {
        self.stream_target = Some(target);
        self
    }

    /// File receiving every record at Info and above, in the full layout
    pub fn all_logs_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.all_logs_file = Some(path.into());
        self
    }

    /// File receiving records at Error and above, in the full layout
    pub fn error_logs_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_logs_file = Some(path.into());
        self
    }

    /// Line written raw to every sink as soon as the logger is built
    pub fn initial_message(mut self, msg: impl Into<String>) -> Self {
        self.initial_message = Some(msg.into());
        self
    }

    /// Build the dispatcher without installing it
    pub fn build(self) -> Result<LogDispatcher> {
        let compact = Arc::new(LevelFormatter::compact(self.time_zone).context("Failed to build compact formatter")?);
        let full = Arc::new(LevelFormatter::full(self.time_zone).context("Failed to build full formatter")?);
        let stream_formatter = if self.compact_stream {
            Arc::clone(&compact)
        } else {
            Arc::clone(&full)
        };

        let mut builder = env_logger::Builder::new();
        if self.respect_env && std::env::var("RUST_LOG").is_ok() {
            builder.parse_default_env();
        } else {
            builder.filter_level(self.level);
        }
        builder.format(move |buf, record| {
            writeln!(buf, "{}", render(&stream_formatter, record))
        });
        if let Some(target) = self.stream_target {
            builder.target(target);
        }
        let stream = builder.build();

        let mut files = Vec::new();
        if let Some(path) = &self.all_logs_file {
            files.push(FileSink::open(path, log::Level::Info, Arc::clone(&full))?);
        }
        if let Some(path) = &self.error_logs_file {
            files.push(FileSink::open(path, log::Level::Error, Arc::clone(&full))?);
        }

        let dispatcher = LogDispatcher {
            level: self.level,
            stream,
            files,
        };

        if let Some(msg) = &self.initial_message {
            dispatcher.raw(msg, true, true);
        }

        Ok(dispatcher)
    }

    /// Build and install as the global `log` logger
    pub fn init(self) -> Result<LoggingHandle> {
        let dispatcher = Arc::new(self.build()?);
        log::set_max_level(dispatcher.max_level());
        log::set_boxed_logger(Box::new(LoggingHandle(Arc::clone(&dispatcher))))
            .context("A global logger is already installed")?;
        Ok(LoggingHandle(dispatcher))
    }
}

struct FileSink {
    path: PathBuf,
    threshold: log::Level,
    formatter: Arc<LevelFormatter>,
    writer: Mutex<RotatingFile>,
}

impl FileSink {
    fn open(path: &Path, threshold: log::Level, formatter: Arc<LevelFormatter>) -> Result<Self> {
        let writer = RotatingFile::open(path).with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            threshold,
            formatter,
            writer: Mutex::new(writer),
        })
    }

    fn write_line(&self, line: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            eprintln!("failed to write log file {}: {}", self.path.display(), e);
        }
    }
}

/// Fans each record out to the stream and file sinks
pub struct LogDispatcher {
    level: LevelFilter,
    stream: env_logger::Logger,
    files: Vec<FileSink>,
}

impl LogDispatcher {
    /// Most verbose level any sink accepts
    pub fn max_level(&self) -> LevelFilter {
        let files = self
            .files
            .iter()
            .map(|f| f.threshold.to_level_filter().min(self.level))
            .max()
            .unwrap_or(LevelFilter::Off);
        self.stream.filter().max(files)
    }

    /// Paths of the attached log files
    pub fn file_paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// Write `msg` unformatted to stdout and, if asked, to the log files
    pub fn raw(&self, msg: &str, to_all_logs: bool, to_error_logs: bool) {
        println!("{}", msg);
        for sink in &self.files {
            let wanted = match sink.threshold {
                log::Level::Error => to_error_logs,
                _ => to_all_logs,
            };
            if wanted {
                sink.write_line(msg);
            }
        }
    }

    fn file_accepts(&self, sink: &FileSink, level: log::Level) -> bool {
        level <= self.level && level <= sink.threshold
    }
}

impl Log for LogDispatcher {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.stream.enabled(metadata) || self.files.iter().any(|f| self.file_accepts(f, metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if self.stream.matches(record) {
            self.stream.log(record);
        }

        let mut full_line: Option<String> = None;
        for sink in &self.files {
            if !self.file_accepts(sink, record.level()) {
                continue;
            }
            let line = full_line.get_or_insert_with(|| render(&sink.formatter, record));
            sink.write_line(line);
        }
    }

    fn flush(&self) {
        self.stream.flush();
        for sink in &self.files {
            if let Ok(mut writer) = sink.writer.lock() {
                let _ = writer.flush();
            }
        }
    }
}

/// Shared handle to the installed dispatcher
#[derive(Clone)]
pub struct LoggingHandle(Arc<LogDispatcher>);

impl LoggingHandle {
    pub fn raw(&self, msg: &str, to_all_logs: bool, to_error_logs: bool) {
        self.0.raw(msg, to_all_logs, to_error_logs);
    }

    pub fn file_paths(&self) -> Vec<&Path> {
        self.0.file_paths()
    }

    /// Flush every sink
    pub fn close(&self) {
        self.0.flush();
    }
}

impl Log for LoggingHandle {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.0.log(record);
    }

    fn flush(&self) {
        self.0.flush();
    }
}

/// Format a facade record; a failure falls back to the bare message
fn render(formatter: &LevelFormatter, record: &Record<'_>) -> String {
    match formatter.format(&LogRecord::from_log(record)) {
        Ok(line) => line,
        Err(_) => format!("{} {}", record.level(), record.args()),
    }
}
