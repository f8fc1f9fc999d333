//! grabbag: small, independent helpers
//!
//! - [`signal`]: ordered listener registry with fault-isolated emission
//! - [`logging`]: level-aware formatting and a `log` backend built on it
//! - [`settings`]: JSON settings file backed by defaults
//! - [`database`]: in-memory collection with change hooks
//! - [`text`], [`calendar`], [`files`], [`fonts`]: string, date and file helpers
//! - [`api`]: GET client for JSON endpoints
//! - [`decorate`]: retry, timing, platform guards, background execution
//! - [`wincmd`]: `attrib`, `icacls` and `tasklist` wrappers

pub mod api;
pub mod calendar;
pub mod database;
pub mod decorate;
pub mod files;
pub mod fonts;
pub mod logging;
pub mod settings;
pub mod signal;
pub mod text;
pub mod wincmd;

pub use logging::{CustomLogging, Level, LevelFormatter, LogRecord};
pub use settings::{Settings, SettingsOptions};
pub use signal::{EmitError, Signal, SignalError, fallible_listener, listener};
