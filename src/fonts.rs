//! Installed font discovery

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FONT_EXTENSIONS: [&str; 5] = ["ttf", "otf", "ttc", "woff", "woff2"];

/// Directories the current platform installs fonts into
pub fn font_dirs() -> Vec<PathBuf> {
    let mut found = Vec::new();

    match std::env::consts::OS {
        "windows" => {
            let windir = std::env::var_os("WINDIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("C:\\Windows"));
            found.push(windir.join("Fonts"));
            if let Some(local) = dirs::data_local_dir() {
                found.push(local.join("Microsoft").join("Windows").join("Fonts"));
            }
        }
        "macos" => {
            found.push(PathBuf::from("/System/Library/Fonts"));
            found.push(PathBuf::from("/Library/Fonts"));
            if let Some(home) = dirs::home_dir() {
                found.push(home.join("Library").join("Fonts"));
            }
        }
        _ => {
            found.push(PathBuf::from("/usr/share/fonts"));
            found.push(PathBuf::from("/usr/local/share/fonts"));
            if let Some(data) = dirs::data_dir() {
                found.push(data.join("fonts"));
            }
            if let Some(home) = dirs::home_dir() {
                found.push(home.join(".fonts"));
            }
        }
    }

    found
}

/// Font names (file stems) found in the platform font directories
pub fn installed_fonts() -> Vec<String> {
    fonts_in(&font_dirs())
}

/// Sorted, deduplicated font file stems below `dirs`
///
/// Missing directories are skipped.
pub fn fonts_in(dirs: &[PathBuf]) -> Vec<String> {
    let mut names = BTreeSet::new();

    for dir in dirs.iter().filter(|d| d.is_dir()) {
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::debug!("Error walking font directory: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && is_font(entry.path())
                && let Some(stem) = entry.path().file_stem()
            {
                names.insert(stem.to_string_lossy().into_owned());
            }
        }
    }

    names.into_iter().collect()
}

fn is_font(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|f| f.eq_ignore_ascii_case(ext)))
}
