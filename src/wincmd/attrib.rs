//! `attrib`: read and change the A/H/I/R/S attributes of a path

use std::fmt;
use std::path::{Path, PathBuf};

use super::{CommandError, CommandRunner, SystemRunner};

/// Width of the attribute column in `attrib` output
const ATTR_COLUMN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Archive,
    Hidden,
    NotIndexed,
    ReadOnly,
    System,
}

impl Flag {
    pub const ALL: [Flag; 5] = [Flag::Archive, Flag::Hidden, Flag::NotIndexed, Flag::ReadOnly, Flag::System];

    pub fn letter(self) -> char {
        match self {
            Flag::Archive => 'A',
            Flag::Hidden => 'H',
            Flag::NotIndexed => 'I',
            Flag::ReadOnly => 'R',
            Flag::System => 'S',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Attributes currently set on a path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes([bool; 5]);

impl Attributes {
    /// Parse the leading attribute column of `attrib <path>` output
    pub fn parse(output: &str) -> Self {
        let mut attrs = Self::default();
        for c in output.chars().take(ATTR_COLUMN).filter(|c| !c.is_whitespace()) {
            if let Some(flag) = Flag::ALL.into_iter().find(|f| f.letter() == c) {
                attrs.0[flag.index()] = true;
            }
        }
        attrs
    }

    pub fn is_set(&self, flag: Flag) -> bool {
        self.0[flag.index()]
    }

    /// `+X` / `-X` arguments turning these attributes into `wanted`
    ///
    /// Flags already in the wanted state produce nothing.
    pub fn changes(&self, wanted: &[(Flag, bool)]) -> Vec<String> {
        Flag::ALL
            .into_iter()
            .filter_map(|flag| {
                let (_, on) = wanted.iter().rev().find(|(f, _)| *f == flag)?;
                match (*on, self.is_set(flag)) {
                    (true, false) => Some(format!("+{}", flag.letter())),
                    (false, true) => Some(format!("-{}", flag.letter())),
                    _ => None,
                }
            })
            .collect()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = Flag::ALL
            .into_iter()
            .map(|flag| if self.is_set(flag) { flag.letter() } else { '-' })
            .collect();
        f.pad(&letters)
    }
}

pub struct Attrib<R: CommandRunner = SystemRunner> {
    path: PathBuf,
    runner: R,
}

impl Attrib<SystemRunner> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_runner(path, SystemRunner)
    }
}

impl<R: CommandRunner> Attrib<R> {
    pub fn with_runner(path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            path: path.into(),
            runner,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<Attributes, CommandError> {
        let output = self.runner.output("attrib", &[self.path_arg()])?;
        Ok(Attributes::parse(&output))
    }

    /// Apply `wanted`; returns `false` when nothing had to change
    pub fn set(&self, wanted: &[(Flag, bool)]) -> Result<bool, CommandError> {
        let mut args = self.get()?.changes(wanted);
        if args.is_empty() {
            return Ok(false);
        }

        args.push(self.path_arg());
        self.runner.output("attrib", &args)?;
        Ok(true)
    }

    fn path_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl<R: CommandRunner> fmt::Debug for Attrib<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attrib").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wincmd::testing::ScriptedRunner;

    const HIDDEN_ARCHIVE: &str = "A    H               C:\\data\\notes.txt\r\n";

    #[test]
    fn test_parse() {
        let attrs = Attributes::parse(HIDDEN_ARCHIVE);
        assert!(attrs.is_set(Flag::Archive));
        assert!(attrs.is_set(Flag::Hidden));
        assert!(!attrs.is_set(Flag::ReadOnly));
        assert_eq!(attrs.to_string(), "AH---");
    }

    #[test]
    fn test_parse_ignores_path_letters() {
        let attrs = Attributes::parse("                     C:\\RSA\\x");
        assert_eq!(attrs, Attributes::default());
    }

    #[test]
    fn test_set_only_changes_what_differs() {
        let runner = ScriptedRunner::new([HIDDEN_ARCHIVE, ""]);
        let attrib = Attrib::with_runner("C:\\data\\notes.txt", runner);

        let changed = attrib
            .set(&[(Flag::Archive, true), (Flag::Hidden, false), (Flag::ReadOnly, true)])
            .unwrap();

        assert!(changed);
        let (program, args) = attrib.runner.call(1);
        assert_eq!(program, "attrib");
        assert_eq!(args, vec!["-H", "+R", "C:\\data\\notes.txt"]);
    }

    #[test]
    fn test_set_noop() {
        let runner = ScriptedRunner::new([HIDDEN_ARCHIVE]);
        let attrib = Attrib::with_runner("C:\\data\\notes.txt", runner);

        assert!(!attrib.set(&[(Flag::Hidden, true), (Flag::System, false)]).unwrap());
        assert_eq!(attrib.runner.calls.borrow().len(), 1);
    }
}
