//! File system helpers

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// First free path made by appending `(1)`, `(2)`, ... to the file stem
///
/// Every candidate is built from the original stem, so after `a(1).txt`
/// comes `a(2).txt`, never a compounded `a(1)(2).txt`.
///
/// Paths that do not exist are returned as is. Existing directories are
/// only renamed when `check_dir` is set.
pub fn new_path(path: impl AsRef<Path>, check_dir: bool) -> PathBuf {
    let path = path.as_ref();
    if !path.exists() || !(path.is_file() || check_dir) {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = parent.join(format!("{}({}){}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Iterator over the chunks of a reader
///
/// Each step reads up to `chunk_size` bytes, then:
/// - with an ignore separator present, drops everything up to its first
///   occurrence and strips the remaining occurrences
/// - with a separator present, yields only what precedes it; the rest is
///   read again on the next step
///
/// Empty chunks are skipped.
pub struct ChunkReader<R> {
    reader: R,
    chunk_size: usize,
    separator: Option<Vec<u8>>,
    ignore_separator: Option<Vec<u8>>,
    pending: Vec<u8>,
    done: bool,
}

impl ChunkReader<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
            separator: None,
            ignore_separator: None,
            pending: Vec::new(),
            done: false,
        }
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn separator(mut self, separator: impl Into<Vec<u8>>) -> Self {
        self.separator = Some(separator.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn ignore_separator(mut self, separator: impl Into<Vec<u8>>) -> Self {
        self.ignore_separator = Some(separator.into()).filter(|s| !s.is_empty());
        self
    }

    /// Up to `chunk_size` raw bytes, pending ones first
    fn fill(&mut self) -> io::Result<Vec<u8>> {
        let mut raw = std::mem::take(&mut self.pending);
        if raw.len() > self.chunk_size {
            self.pending = raw.split_off(self.chunk_size);
        }

        let mut buf = vec![0u8; self.chunk_size];
        while raw.len() < self.chunk_size {
            let want = self.chunk_size - raw.len();
            let n = self.reader.read(&mut buf[..want])?;
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        Ok(raw)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let raw = match self.fill() {
                Ok(raw) => raw,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if raw.is_empty() {
                self.done = true;
                break;
            }

            let mut data = raw.clone();
            if let Some(ignore) = &self.ignore_separator
                && let Some(pos) = find(&data, ignore)
            {
                data = remove_all(&data[pos + ignore.len()..], ignore);
            }

            let mut remainder = 0;
            if let Some(sep) = &self.separator
                && let Some(pos) = find(&data, sep)
            {
                remainder = data.len() - pos - sep.len();
                data.truncate(pos);
            }

            // The tail of the raw chunk is re-read, as a seek back would do
            if remainder > 0 {
                let mut tail = raw[raw.len() - remainder..].to_vec();
                tail.append(&mut self.pending);
                self.pending = tail;
            }

            if !data.is_empty() {
                return Some(Ok(data));
            }
        }
        None
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn remove_all(data: &[u8], needle: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(needle) {
            i += needle.len();
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Delete the files directly inside `dir` that match `condition`
///
/// Returns the deleted paths. Subdirectories are left alone.
pub fn delete_files_by_condition<F>(dir: impl AsRef<Path>, condition: F) -> io::Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut deleted = Vec::new();

    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !condition(entry.path()) {
            continue;
        }
        fs::remove_file(entry.path())?;
        log::debug!("Deleted {}", entry.path().display());
        deleted.push(entry.into_path());
    }

    Ok(deleted)
}

/// Delete files whose names start with `prefix` and end with `suffix`
pub fn delete_files_by_prefix_suffix(
    dir: impl AsRef<Path>,
    prefix: &str,
    suffix: &str,
) -> io::Result<Vec<PathBuf>> {
    delete_files_by_condition(dir, |path| {
        path.file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                name.starts_with(prefix) && name.ends_with(suffix)
            })
            .unwrap_or(false)
    })
}

/// Unused random path in `dir` (the temp directory when `None`)
///
/// The file is created to reserve a unique name, then removed again.
pub fn random_file_path(dir: Option<&Path>, extension: &str) -> io::Result<PathBuf> {
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
    let extension = extension.trim_start_matches('.');
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    };

    let file = tempfile::Builder::new()
        .prefix("")
        .suffix(&suffix)
        .rand_bytes(12)
        .tempfile_in(dir)?;
    let path = file.path().to_path_buf();
    file.close()?;
    Ok(path)
}
