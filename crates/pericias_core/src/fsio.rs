//! Small filesystem helpers shared by the record store and the exporter.

use std::io;
use std::path::{Path, PathBuf};

/// Writes `payload` to `path` through a sibling `.tmp` file and a rename.
///
/// Creates missing parent directories. Readers never observe a half-written
/// file, but concurrent writers still race; the last rename wins.
pub fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, payload)?;
    std::fs::rename(&temp_path, path)
}

fn temp_path_for(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => path.with_extension("tmp"),
    }
}
