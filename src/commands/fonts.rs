use colored::*;
use eyre::Result;

use grabbag::{fonts, text};

pub fn run(filter: Option<&str>, grouped: bool) -> Result<()> {
    let names = select(fonts::installed_fonts(), filter);
    if names.is_empty() {
        println!("No fonts found");
        return Ok(());
    }
    let count = names.len();

    if grouped {
        for group in text::combine_single_items(text::similarized(names, None)) {
            println!("{}", group.join(", "));
        }
    } else {
        for name in &names {
            println!("{}", name);
        }
    }

    println!("{}", format!("{} font(s)", count).dimmed());
    Ok(())
}

/// Names containing `filter`, ignoring case
fn select(names: Vec<String>, filter: Option<&str>) -> Vec<String> {
    match filter {
        Some(f) => {
            let f = f.to_lowercase();
            names.into_iter().filter(|n| n.to_lowercase().contains(&f)).collect()
        }
        None => names,
    }
}
