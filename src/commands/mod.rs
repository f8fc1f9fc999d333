pub mod completions;
pub mod config;
pub mod files;
pub mod fonts;
pub mod log;
pub mod settings;
pub mod tasks;
pub mod text;
