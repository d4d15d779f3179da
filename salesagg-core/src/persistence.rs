//! Crash-safe output files: generated CSVs and `--summary-json` reports.
//!
//! Output is staged in a `<file>.partial` sibling and renamed into place, so
//! readers never see a half-written file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pretty-print `value` as JSON into `path`.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    json.push(b'\n');
    atomic_write(path, &json)
}

/// Replace `path` with `bytes`, creating missing parent directories.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)?,
        _ => {}
    }
    let staged = staging_path(path);
    fs::write(&staged, bytes)?;
    fs::rename(&staged, path)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}
