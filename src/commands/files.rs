use eyre::{Context, Result};

use grabbag::files;

use crate::cli::FilesAction;
use crate::config::Config;

pub fn run(action: FilesAction) -> Result<()> {
    match action {
        FilesAction::NewPath { path, dirs } => {
            let path = Config::expand_path(&path);
            println!("{}", files::new_path(&path, dirs).display());
        }
        FilesAction::RandomPath { dir, extension } => {
            let dir = dir.map(|d| Config::expand_path(&d));
            let path = files::random_file_path(dir.as_deref(), &extension).context("Failed to pick a random path")?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
