//! Atomic file writes for persisted editor data.
//!
//! Writes go to a temp file next to the target and are renamed into place,
//! so a reader never sees a half-written file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Generate a temp path for atomic writes.
/// Format: {dir}/.tmp.{random}.{filename}
pub fn temp_path(final_path: &Path) -> PathBuf {
    let filename = final_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let random: u64 = rand::random();
    final_path.with_file_name(format!(".tmp.{:016x}.{}", random, filename))
}

/// Write content to `final_path`, replacing any previous content.
pub fn write_file(final_path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = temp_path(final_path);
    fs::write(&temp, content)?;
    if let Err(e) = fs::rename(&temp, final_path) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}
