//! `icacls`: grant, deny and remove access for one account on a path

use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{CommandError, CommandRunner, SystemRunner};

pub const DEFAULT_ACCOUNT: &str = "Everyone";

/// Simple `icacls` permission codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// No access
    N,
    /// Full access
    F,
    /// Modify
    M,
    /// Read and execute
    RX,
    /// Read-only
    R,
    /// Write-only
    W,
    /// Delete
    D,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::N,
        Permission::F,
        Permission::M,
        Permission::RX,
        Permission::R,
        Permission::W,
        Permission::D,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::N => "N",
            Permission::F => "F",
            Permission::M => "M",
            Permission::RX => "RX",
            Permission::R => "R",
            Permission::W => "W",
            Permission::D => "D",
        }
    }

    /// How an existing deny entry for this permission shows up in `icacls` output
    fn deny_marker(self) -> String {
        match self {
            Permission::F => "(N)".to_string(),
            other => format!("(DENY)({})", other.as_str()),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| CommandError::Permission(s.to_string()))
    }
}

pub struct Icacls<R: CommandRunner = SystemRunner> {
    path: PathBuf,
    account: String,
    runner: R,
}

impl Icacls<SystemRunner> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_runner(path, DEFAULT_ACCOUNT, SystemRunner)
    }
}

impl<R: CommandRunner> Icacls<R> {
    pub fn with_runner(path: impl Into<PathBuf>, account: impl Into<String>, runner: R) -> Self {
        Self {
            path: path.into(),
            account: account.into(),
            runner,
        }
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn account_name(&self) -> &str {
        &self.account
    }

    /// ACL entries keyed `"<line>- <account>"`
    pub fn info(&self) -> Result<IndexMap<String, String>, CommandError> {
        let output = self.run(&[])?;
        Ok(parse_info(&output, &self.path_arg()))
    }

    pub fn grant(&self, perm: Permission) -> Result<String, CommandError> {
        self.run(&["/grant".to_string(), self.account_with(perm)])
    }

    /// Deny `perm`; `None` when an equivalent deny entry already exists
    pub fn deny(&self, perm: Permission) -> Result<Option<String>, CommandError> {
        let marker = perm.deny_marker();
        let already = self
            .info()?
            .iter()
            .any(|(who, rights)| who.contains(&self.account) && rights.contains(&marker));
        if already {
            log::debug!("{} already denied {} on {}", self.account, perm, self.path.display());
            return Ok(None);
        }

        self.run(&["/deny".to_string(), self.account_with(perm)]).map(Some)
    }

    /// Drop every entry of the account
    pub fn remove(&self) -> Result<String, CommandError> {
        self.run(&["/remove".to_string(), self.account.clone()])
    }

    fn account_with(&self, perm: Permission) -> String {
        format!("{}:(OI)(CI){}", self.account, perm)
    }

    fn run(&self, extra: &[String]) -> Result<String, CommandError> {
        let mut args = vec![self.path_arg()];
        args.extend_from_slice(extra);
        self.runner.output("icacls", &args).inspect_err(|e| log::error!("{}", e))
    }

    fn path_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl<R: CommandRunner> fmt::Debug for Icacls<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Icacls")
            .field("path", &self.path)
            .field("account", &self.account)
            .finish()
    }
}

/// Parse `icacls <path>` output into `"<line>- <account>" -> rights`
///
/// Line numbers count every line, including the ones that are skipped for
/// not being a single `account:rights` pair.
pub fn parse_info(output: &str, path: &str) -> IndexMap<String, String> {
    let output = output.strip_prefix(path).unwrap_or(output);
    let output = output.replace("  ", "");

    output
        .trim()
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let parts: Vec<&str> = line.split(':').collect();
            match parts.as_slice() {
                [who, rights] => Some((format!("{}- {}", i + 1, who), rights.to_string())),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wincmd::testing::ScriptedRunner;

    const PATH: &str = "C:\\data";
    const OUTPUT: &str = "C:\\data Everyone:(OI)(CI)(N)\r\n        BUILTIN\\Administrators:(OI)(CI)(F)\r\n\r\nSuccessfully processed 1 files; Failed processing 0 files\r\n";

    #[test]
    fn test_parse_info() {
        let info = parse_info(OUTPUT, PATH);
        assert_eq!(info.len(), 2);
        assert_eq!(info["1- Everyone"], "(OI)(CI)(N)");
        assert_eq!(info["2- BUILTIN\\Administrators"], "(OI)(CI)(F)");
    }

    #[test]
    fn test_permission_from_str() {
        assert_eq!("rx".parse::<Permission>().unwrap(), Permission::RX);
        assert_eq!("F".parse::<Permission>().unwrap(), Permission::F);
        assert!(matches!("X".parse::<Permission>(), Err(CommandError::Permission(_))));
    }

    #[test]
    fn test_grant_args() {
        let icacls = Icacls::with_runner(PATH, "Everyone", ScriptedRunner::default());
        icacls.grant(Permission::M).unwrap();

        let (program, args) = icacls.runner.call(0);
        assert_eq!(program, "icacls");
        assert_eq!(args, vec![PATH, "/grant", "Everyone:(OI)(CI)M"]);
    }

    #[test]
    fn test_remove_args() {
        let icacls = Icacls::with_runner(PATH, "Guest", ScriptedRunner::default());
        icacls.remove().unwrap();
        assert_eq!(icacls.runner.call(0).1, vec![PATH, "/remove", "Guest"]);
    }

    #[test]
    fn test_deny_skipped_when_present() {
        let icacls = Icacls::with_runner(PATH, "Everyone", ScriptedRunner::new([OUTPUT]));
        assert_eq!(icacls.deny(Permission::F).unwrap(), None);
        assert_eq!(icacls.runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_deny_runs_when_missing() {
        let icacls = Icacls::with_runner(PATH, "Everyone", ScriptedRunner::new([OUTPUT, "done"]));
        assert_eq!(icacls.deny(Permission::W).unwrap(), Some("done".to_string()));
        assert_eq!(icacls.runner.call(1).1, vec![PATH, "/deny", "Everyone:(OI)(CI)W"]);
    }
}
