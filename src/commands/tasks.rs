use colored::*;
use eyre::{Context, Result};

use grabbag::wincmd::{SystemRunner, TaskList};

pub fn run(exe: Option<&str>) -> Result<()> {
    let tasks = TaskList::load(&SystemRunner).context("Failed to list running tasks")?;

    match exe {
        Some(exe) => {
            if tasks.is_running(exe) {
                println!("{} {} is running", "✓".green(), exe);
            } else {
                println!("{} {} is not running", "✗".red(), exe);
                std::process::exit(1);
            }
        }
        None => print!("{}", tasks),
    }
    Ok(())
}
