//! Request-path validation and symlink-escape detection.
//!
//! Every file named in a request arrives as an untrusted workspace-relative
//! string. Resolution canonicalizes the workspace root, normalizes the
//! candidate path, rejects `..` traversal, and detects symlink-based
//! escapes.

use std::path::{Component, Path, PathBuf};

use crate::{AppError, Result};

/// Resolve an untrusted relative path against `root`.
///
/// The candidate must be a non-empty workspace-relative path; absolute and
/// home-relative (`~`) paths are rejected outright. The resolved path is
/// guaranteed to lie under `root` after symlink resolution.
///
/// # Errors
///
/// Returns `AppError::InvalidPath` if `rel` is empty, absolute, or starts
/// with `~`. Returns `AppError::PathEscape` if the workspace root cannot be
/// canonicalized or the resolved path is not a descendant of it.
pub fn resolve_request_path(root: &Path, rel: &str) -> Result<PathBuf> {
    if rel.trim().is_empty() {
        return Err(AppError::InvalidPath("path must not be empty".into()));
    }
    if rel.starts_with('/') {
        return Err(AppError::InvalidPath(
            "absolute paths are not allowed; use workspace-relative paths".into(),
        ));
    }
    if rel.starts_with('~') {
        return Err(AppError::InvalidPath(
            "home-relative paths are not allowed".into(),
        ));
    }

    let root = root
        .canonicalize()
        .map_err(|err| AppError::PathEscape(format!("workspace root invalid: {err}")))?;

    let mut normalized = PathBuf::new();
    for component in Path::new(rel).components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(AppError::PathEscape(
                        "path attempts to escape workspace".into(),
                    ));
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::InvalidPath(
                    "absolute paths are not allowed; use workspace-relative paths".into(),
                ));
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    let absolute = root.join(normalized);
    if !absolute.starts_with(&root) {
        return Err(AppError::PathEscape("path outside workspace".into()));
    }

    // Symlink escape detection: if the path exists, canonicalize resolves
    // symlinks and we verify the final target is still within the root.
    if absolute.exists() {
        let canonical = absolute
            .canonicalize()
            .map_err(|err| AppError::PathEscape(format!("cannot resolve path: {err}")))?;

        if !canonical.starts_with(&root) {
            return Err(AppError::PathEscape(
                "symlink target escapes workspace".into(),
            ));
        }

        Ok(canonical)
    } else {
        Ok(absolute)
    }
}
