//! Content-integrity guardrails for proposed file contents.
//!
//! All guards are pure functions of `(relpath, instruction, old, new)` and
//! run in a fixed order:
//!
//! 1. Control characters are banned in the new content.
//! 2. A no-op edit always passes.
//! 3. `from __future__ import` placement rules (when applicable).
//! 4. Anti-destructive-rewrite similarity check, with a stricter
//!    special case for `README.md`.

pub mod probe;

use std::path::Path;

use similar::TextDiff;

use crate::{AppError, Result};

const TRIPLE_DQ: &str = "\"\"\"";
const TRIPLE_SQ: &str = "'''";

const FUTURE_IMPORT: &str = "from __future__ import";

/// Instruction keywords that lift the rewrite-violence guard.
const REWRITE_KEYWORDS: &[&str] = &[
    "rewrite", "refactor", "reformat", "format", "overhaul", "replace", "full", "cleanup",
    "clean up", "modernize",
];

/// Minimum similarity ratio for a non-README edit without a rewrite keyword.
const MIN_SIMILARITY: f64 = 0.20;
/// Minimum similarity ratio for a README edit without a rewrite keyword.
const README_MIN_SIMILARITY: f64 = 0.90;

/// True when `s` contains an ASCII control byte other than `\t`, `\n`, `\r`.
fn has_control_chars(s: &str) -> bool {
    s.bytes()
        .any(|b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
}

/// True when any line's first non-whitespace token starts a future import.
pub(crate) fn has_future_import(text: &str) -> bool {
    text.lines()
        .any(|ln| ln.trim_start().starts_with(FUTURE_IMPORT))
}

/// Index of the first statement line after the allowed prelude: blank
/// lines, `#` comments, an optional module docstring, more blank lines.
pub(crate) fn prelude_end(lines: &[&str]) -> usize {
    let mut i = 0;

    // Blank lines + comments.
    while i < lines.len() {
        let s = lines[i];
        if s.trim().is_empty() || s.trim_start().starts_with('#') {
            i += 1;
        } else {
            break;
        }
    }

    // Optional module docstring.
    if i < lines.len() {
        let s0 = lines[i].trim_start();
        let quote = if s0.starts_with(TRIPLE_DQ) {
            Some(TRIPLE_DQ)
        } else if s0.starts_with(TRIPLE_SQ) {
            Some(TRIPLE_SQ)
        } else {
            None
        };
        if let Some(q) = quote {
            if s0.matches(q).count() >= 2 {
                // Opening and closing delimiter on the same line.
                i += 1;
            } else {
                i += 1;
                while i < lines.len() {
                    let done = lines[i].contains(q);
                    i += 1;
                    if done {
                        break;
                    }
                }
            }
        }
    }

    // Blank lines after the docstring.
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    i
}

/// Python rule: future imports must appear near the top, preceded only by
/// blank lines, comments, and the module docstring.
fn future_import_in_allowed_region(new: &str) -> bool {
    let lines: Vec<&str> = new.lines().collect();
    let i = prelude_end(&lines);
    i < lines.len() && lines[i].trim_start().starts_with(FUTURE_IMPORT)
}

/// Future-import placement guard.
///
/// Enforced when the old file carried a future import (the new one must
/// keep it, correctly placed) or when a `.py` edit introduces one (it must
/// land in the allowed region).
pub(crate) fn guard_future_import(relpath: &str, old: &str, new: &str) -> Result<()> {
    if has_future_import(old) {
        if !has_future_import(new) {
            return Err(AppError::GuardBlocked("future_import_removed".into()));
        }
        if !future_import_in_allowed_region(new) {
            return Err(AppError::GuardBlocked("future_import_moved".into()));
        }
        return Ok(());
    }

    if relpath.ends_with(".py") && has_future_import(new) && !future_import_in_allowed_region(new)
    {
        return Err(AppError::GuardBlocked("future_import_moved".into()));
    }
    Ok(())
}

/// Reduce formatting-only noise before measuring similarity: LF-only
/// newlines, right-stripped lines, blank-line runs collapsed to one,
/// leading/trailing blanks stripped overall.
fn normalize_for_similarity(s: &str) -> String {
    let unified = s.replace("\r\n", "\n").replace('\r', "\n");

    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;
    for ln in unified.lines().map(str::trim_end) {
        if ln.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 1 {
                out.push("");
            }
            continue;
        }
        blank_run = 0;
        out.push(ln);
    }

    out.join("\n").trim().to_owned()
}

/// Line-level sequence-matcher ratio between normalized forms of `old`
/// and `new`. Line-based similarity is far more stable than raw char
/// similarity for code, especially under reformatting.
#[must_use]
pub fn similarity_ratio(old: &str, new: &str) -> f64 {
    let a = normalize_for_similarity(old);
    let b = normalize_for_similarity(new);
    let a_lines: Vec<&str> = a.lines().collect();
    let b_lines: Vec<&str> = b.lines().collect();
    f64::from(TextDiff::from_slices(&a_lines, &b_lines).ratio())
}

fn allow_big_rewrite(instruction: &str) -> bool {
    let s = instruction.to_lowercase();
    REWRITE_KEYWORDS.iter().any(|k| s.contains(k))
}

/// Run every content guard against the proposed new contents.
///
/// # Errors
///
/// Returns `AppError::GuardBlocked` carrying one of `control_chars`,
/// `future_import_removed`, `future_import_moved`,
/// `README rewrite blocked`, or `rewrite too violent (similarity=R)`.
pub fn enforce_guards(relpath: &str, instruction: &str, old: &str, new: &str) -> Result<()> {
    if has_control_chars(new) {
        return Err(AppError::GuardBlocked("control_chars".into()));
    }

    // A no-op edit is always allowed.
    if old == new {
        return Ok(());
    }

    guard_future_import(relpath, old, new)?;

    // Nothing to destroy: filling a fresh or blank file is never a
    // destructive rewrite.
    if normalize_for_similarity(old).is_empty() {
        return Ok(());
    }

    let ratio = similarity_ratio(old, new);
    let overridden = allow_big_rewrite(instruction);

    let is_readme = Path::new(relpath)
        .file_name()
        .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case("readme.md"));

    // README is protected: unless the user asked for a rewrite, block
    // large rewrites hard.
    if is_readme && !overridden && ratio < README_MIN_SIMILARITY {
        return Err(AppError::GuardBlocked("README rewrite blocked".into()));
    }

    if !overridden && ratio < MIN_SIMILARITY {
        return Err(AppError::GuardBlocked(format!(
            "rewrite too violent (similarity={ratio:.2})"
        )));
    }

    Ok(())
}
