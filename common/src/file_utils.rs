//! File utility functions for enumerating numbered output directories.

use std::fs;
use std::io;
use std::path::Path;

/// Returns the numeric suffixes of all subdirectories of `dir` named
/// `{prefix}{digits}`, e.g. `img0`, `img12`. A missing `dir` yields nothing.
pub fn numbered_subdirs(dir: &Path, prefix: &str) -> io::Result<Vec<u64>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut numbers = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(number) = parse_numbered_name(name, prefix) {
            numbers.push(number);
        }
    }

    Ok(numbers)
}

/// Parses `{prefix}{digits}` into the number. Signs, spaces and empty
/// suffixes are rejected.
pub fn parse_numbered_name(name: &str, prefix: &str) -> Option<u64> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
