//! Atomic file writing.
//!
//! Creates parent directories as needed, optionally snapshots the current
//! contents to a sibling backup, and writes via
//! `tempfile::NamedTempFile::persist()` so a crash can never leave a
//! partial file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{AppError, Result};

/// Suffix appended to the original file name for sibling backups.
pub const BACKUP_SUFFIX: &str = ".shellgeist.bak";

/// Summary of a completed file write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes_written: usize,
}

/// Write `contents` to `path` atomically.
///
/// - Creates parent directories if they do not exist.
/// - When `backup` is set and the file already exists, writes a sibling
///   `<name>.shellgeist.bak` first (best-effort; a failed backup never
///   blocks the write).
/// - Writes to a temporary file in the same directory, then atomically
///   renames into place. The temp file is removed on error.
///
/// # Errors
///
/// Returns `AppError::Io` on directory creation, temp file write, or
/// rename failures.
pub fn write_atomic(path: &Path, contents: &str, backup: bool) -> Result<WriteSummary> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::Io("file path has no parent directory".into()))?;

    fs::create_dir_all(parent).map_err(|err| {
        AppError::Io(format!(
            "failed to create parent directories for {}: {err}",
            path.display()
        ))
    })?;

    if backup {
        write_backup(path);
    }

    let mut tmp = NamedTempFile::new_in(parent)
        .map_err(|err| AppError::Io(format!("failed to create temporary file: {err}")))?;

    tmp.write_all(contents.as_bytes())
        .map_err(|err| AppError::Io(format!("failed to write temporary file: {err}")))?;

    tmp.persist(path).map_err(|err| {
        AppError::Io(format!(
            "failed to persist file to {}: {err}",
            path.display()
        ))
    })?;

    Ok(WriteSummary {
        path: path.to_path_buf(),
        bytes_written: contents.len(),
    })
}

/// Snapshot the current contents of `path` to `<name>.shellgeist.bak`.
fn write_backup(path: &Path) {
    let Ok(existing) = fs::read(path) else {
        return;
    };
    let Some(name) = path.file_name() else {
        return;
    };
    let mut bak_name = name.to_os_string();
    bak_name.push(BACKUP_SUFFIX);
    let _ = fs::write(path.with_file_name(bak_name), existing);
}
