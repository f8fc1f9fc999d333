//! Wrappers around the Windows `attrib`, `icacls` and `tasklist` commands
//!
//! Commands go through a [`CommandRunner`]. [`SystemRunner`] executes them
//! for real and refuses to run anywhere but Windows; the output parsing is
//! plain string work and behaves the same on every platform.

pub mod attrib;
pub mod icacls;
pub mod tasklist;

pub use attrib::{Attrib, Attributes, Flag};
pub use icacls::{Icacls, Permission};
pub use tasklist::TaskList;

use std::io;
use std::process::Command;
use thiserror::Error;

use crate::decorate::{UnsupportedPlatform, ensure_platform};

/// Hides the console window of spawned commands
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedPlatform),

    #[error("command not found: {program}")]
    NotFound { program: String },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("permission not allowed: {0}")]
    Permission(String),

    #[error("unreadable command output: {0}")]
    Parse(#[from] csv::Error),
}

/// Runs a program and returns its standard output
pub trait CommandRunner {
    fn output(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Executes commands on the local machine (Windows only)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        ensure_platform(&["windows"])?;

        let path = which::which(program).map_err(|_| CommandError::NotFound {
            program: program.to_string(),
        })?;

        let mut cmd = Command::new(path);
        cmd.args(args);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        log::debug!("Running {} {}", program, args.join(" "));
        let out = cmd.output().map_err(|source| CommandError::Io {
            program: program.to_string(),
            source,
        })?;

        if !out.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned outputs and records every call
    #[derive(Default)]
    pub struct ScriptedRunner {
        outputs: RefCell<VecDeque<String>>,
        pub calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedRunner {
        pub fn new<I, S>(outputs: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                outputs: RefCell::new(outputs.into_iter().map(Into::into).collect()),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn call(&self, n: usize) -> (String, Vec<String>) {
            self.calls.borrow()[n].clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn output(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
            self.calls.borrow_mut().push((program.to_string(), args.to_vec()));
            Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
        }
    }
}
