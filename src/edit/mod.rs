//! The edit pipeline: driver, finalization, autofix, and apply entry
//! points.

pub mod autofix;
pub mod driver;
pub mod finalize;
pub mod handlers;
pub mod prompts;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::{AppError, Result};

/// Result envelope for edit planning and application.
///
/// Success carries the hunks-only `patch`, the display `diff` (with
/// synthetic file headers), and — for apply operations — `written` and
/// `staged` flags. Failure carries the stable `error` identifier, an
/// optional `detail`, and, for guard rejections, the offending `patch`.
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Workspace-relative target file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Hunks-only canonical patch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    /// Patch wrapped with `--- a/<path>` / `+++ b/<path>` headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Whether the file was written to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<bool>,
    /// Whether the file was staged in version control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged: Option<bool>,
    /// Stable error identifier on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EditOutcome {
    /// Successful plan: validated patch, nothing written.
    #[must_use]
    pub fn planned(file: &str, patch: String, diff: String) -> Self {
        Self {
            ok: true,
            file: Some(file.to_owned()),
            patch: Some(patch),
            diff: Some(diff),
            written: None,
            staged: None,
            error: None,
            detail: None,
        }
    }

    /// Successful apply: patch committed to disk.
    #[must_use]
    pub fn applied(file: &str, patch: String, diff: String, staged: bool) -> Self {
        Self {
            ok: true,
            file: Some(file.to_owned()),
            patch: Some(patch),
            diff: Some(diff),
            written: Some(true),
            staged: Some(staged),
            error: None,
            detail: None,
        }
    }

    /// Failure envelope for an application error.
    #[must_use]
    pub fn failure(err: &AppError, file: Option<&str>, patch: Option<String>) -> Self {
        let detail = err.detail();
        Self {
            ok: false,
            file: file.map(ToOwned::to_owned),
            patch,
            diff: None,
            written: None,
            staged: None,
            error: Some(err.code().to_owned()),
            detail: (!detail.is_empty()).then(|| detail.to_owned()),
        }
    }
}

/// Read the target file, mapping a missing file to `file_not_found`.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(AppError::FileNotFound(path.display().to_string()))
        }
        Err(err) => Err(AppError::Io(format!(
            "failed to read {}: {err}",
            path.display()
        ))),
    }
}
