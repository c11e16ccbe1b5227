//! File access for the command-line tool
//!
//! The library operates on bytes; this module is where paths come in.

use glob::glob;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Read a whole input file
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read input");
    Ok(bytes)
}

/// Write `bytes` to `path` atomically
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed over `path` once complete, so a failed write never leaves a
/// truncated output behind.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

/// Expand glob patterns in input paths
///
/// Patterns keep the order they were given in; the matches of a single
/// pattern are sorted. Arguments without glob characters are taken as
/// literal paths.
pub fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;
        let mut matched = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => matched.push(path),
                Err(e) => warn!(pattern = %pattern, error = %e, "glob error"),
            }
        }

        if matched.is_empty() {
            return Err(Error::NoFilesMatched(pattern.clone()));
        }
        matched.sort();
        paths.extend(matched);
    }

    Ok(paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}
