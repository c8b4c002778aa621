//! Future-import placement autofix.
//!
//! An idempotent rewrite: strip every `from __future__ import` line from
//! the proposed contents, then splice them back immediately after the
//! prelude (comments, module docstring, blank lines). Duplicate statements
//! collapse to the first occurrence, order preserved.

use crate::guards::{self, prelude_end};

const FUTURE_IMPORT: &str = "from __future__ import";

/// Rewrite `new` so its future imports sit in the allowed region.
///
/// Returns `Some(fixed)` only when the placement guard currently fails
/// with `future_import_moved` and the rewrite makes it pass; `None` means
/// either no fix is needed or no fix is possible (caller keeps `new`).
#[must_use]
pub fn autofix_future_imports(relpath: &str, old: &str, new: &str) -> Option<String> {
    match guards::guard_future_import(relpath, old, new) {
        Ok(()) => return None,
        Err(err) if err.detail() == "future_import_moved" => {}
        // Removed entirely: there is nothing to re-place.
        Err(_) => return None,
    }

    let lines: Vec<&str> = new.lines().collect();

    // First-occurring text of each unique statement wins, order preserved.
    let mut imports: Vec<&str> = Vec::new();
    let mut remaining: Vec<&str> = Vec::new();
    for ln in &lines {
        if ln.trim_start().starts_with(FUTURE_IMPORT) {
            let statement = ln.trim();
            if !imports.contains(&statement) {
                imports.push(statement);
            }
        } else {
            remaining.push(*ln);
        }
    }
    if imports.is_empty() {
        return None;
    }

    let insert_at = prelude_end(&remaining);
    let mut rebuilt_lines: Vec<&str> = Vec::with_capacity(remaining.len() + imports.len());
    rebuilt_lines.extend_from_slice(&remaining[..insert_at]);
    rebuilt_lines.extend_from_slice(&imports);
    rebuilt_lines.extend_from_slice(&remaining[insert_at..]);

    let mut rebuilt = rebuilt_lines.join("\n");
    if new.ends_with('\n') {
        rebuilt.push('\n');
    }

    // Accept the rewrite only if the guard now passes.
    guards::guard_future_import(relpath, old, &rebuilt)
        .is_ok()
        .then_some(rebuilt)
}
