//! Post-apply verification: autofix, syntax probe, content guards, and
//! patch reconstruction.

use crate::diff::normalize_diff;
use crate::edit::autofix::autofix_future_imports;
use crate::guards::{self, enforce_guards, probe::check_syntax};
use crate::Result;

/// Verified edit ready to surface or write.
#[derive(Debug, Clone)]
pub struct Finalized {
    /// The (possibly autofixed) new file contents.
    pub new: String,
    /// Hunks-only canonical patch from old to new.
    pub patch: String,
    /// Patch wrapped with synthetic `--- a/` / `+++ b/` file headers.
    pub diff: String,
}

/// Run the finalize sequence over proposed new contents.
///
/// 1. Autofix future-import placement (revert if the guard still fails).
/// 2. Syntax probe; a probe failure caused by a placement violation is
///    reported as `future_import_moved` instead.
/// 3. Content guards.
/// 4. Rebuild `patch` when autofix rewrote the contents.
///
/// # Errors
///
/// Returns `AppError::GuardBlocked` with the first violated guard's
/// detail.
pub fn finalize_contents(
    relpath: &str,
    instruction: &str,
    old: &str,
    mut new: String,
    mut patch: String,
) -> Result<Finalized> {
    let mut rewritten = false;
    if let Some(fixed) = autofix_future_imports(relpath, old, &new) {
        new = fixed;
        rewritten = true;
    }

    if let Err(probe_err) = check_syntax(relpath, &new) {
        // A misplaced future import is the more actionable report.
        return Err(match guards::guard_future_import(relpath, old, &new) {
            Err(err) if err.detail() == "future_import_moved" => err,
            _ => probe_err,
        });
    }

    enforce_guards(relpath, instruction, old, &new)?;

    if rewritten {
        patch = rebuild_patch(old, &new);
    }
    let diff = display_diff(relpath, &patch);

    Ok(Finalized { new, patch, diff })
}

/// Hunks-only unified diff from `old` to `new`.
#[must_use]
pub fn rebuild_patch(old: &str, new: &str) -> String {
    let patch = diffy::create_patch(old, new).to_string();
    if !patch.contains("@@") {
        // No hunks: the contents are identical.
        return String::new();
    }
    normalize_diff(&patch)
}

/// Wrap a hunks-only patch with file headers for external diff viewers.
#[must_use]
pub fn display_diff(relpath: &str, patch: &str) -> String {
    format!("--- a/{relpath}\n+++ b/{relpath}\n{patch}")
}
