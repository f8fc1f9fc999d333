//! Level-aware log formatting and logger setup
//!
//! - [`LevelFormatter`]: picks a template per severity level
//! - [`Zone`]: named or fixed-offset time zone for timestamps
//! - [`CustomLogging`]: installs a `log` backend with a terminal stream and
//!   optional rotated files, each using a level formatter

pub mod formatter;
pub mod record;
pub mod rotate;
pub mod setup;
pub mod template;
pub mod zone;

pub use formatter::{FormatError, FormatMode, LevelFormatter, LevelFormatterBuilder, parse_utc_offset};
pub use record::{Level, Location, LogRecord};
pub use rotate::RotatingFile;
pub use setup::{CustomLogging, LogDispatcher, LoggingHandle};
pub use template::{Field, Template};
pub use zone::Zone;
