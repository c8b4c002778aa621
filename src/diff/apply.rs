//! Restricted-dialect unified diff application.
//!
//! The dialect accepted here is deliberately narrow: a sequence of hunks,
//! each a `@@ -OLD_START[,OLD_LEN] +NEW_START[,NEW_LEN] @@` header followed
//! by ` `/`-`/`+`/`\` body lines. Only `OLD_START` is consumed; lengths are
//! ignored. Hunks must not move backward in the target. Lines compare
//! byte-exact including their trailing LF/CRLF.

use crate::{AppError, Result};

/// Split text into lines that keep their trailing terminator.
fn split_keepends(s: &str) -> Vec<&str> {
    s.split_inclusive('\n').collect()
}

fn eat_number(s: &str) -> Option<(usize, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse::<usize>().ok()?;
    Some((value, &s[end..]))
}

fn eat_spaces(s: &str) -> Option<&str> {
    let trimmed = s.trim_start_matches([' ', '\t']);
    if trimmed.len() == s.len() {
        None
    } else {
        Some(trimmed)
    }
}

/// Parse `@@ -OLD_START[,OLD_LEN] +NEW_START[,NEW_LEN] @@` at the start of
/// `s`. Returns `OLD_START` and the byte length of the header on success.
pub(crate) fn parse_hunk_prefix(s: &str) -> Option<(usize, usize)> {
    let rest = s.strip_prefix("@@")?;
    let rest = eat_spaces(rest)?;
    let rest = rest.strip_prefix('-')?;
    let (old_start, rest) = eat_number(rest)?;
    let rest = match rest.strip_prefix(',') {
        Some(r) => eat_number(r)?.1,
        None => rest,
    };
    let rest = eat_spaces(rest)?;
    let rest = rest.strip_prefix('+')?;
    let (_, rest) = eat_number(rest)?;
    let rest = match rest.strip_prefix(',') {
        Some(r) => eat_number(r)?.1,
        None => rest,
    };
    let rest = eat_spaces(rest)?;
    let rest = rest.strip_prefix("@@")?;
    Some((old_start, s.len() - rest.len()))
}

/// Apply a unified diff (diff -u style) to `old` and return the new content.
///
/// Tolerates leading headers/noise until the first `@@` hunk, and hunks that
/// point past EOF (clamped, supporting append-at-end patches). Rejects an
/// empty patch, malformed headers, body lines with unknown prefixes, hunks
/// with no body, and context/delete lines that do not match `old`.
///
/// # Errors
///
/// Returns `AppError::PatchApply` carrying one of the hunk-level causes:
/// `no hunks found`, `invalid hunk header`, `context mismatch`,
/// `context EOF`, `delete mismatch`, `delete EOF`, `invalid hunk line`,
/// `empty hunk body`, or `target before current index`.
pub fn apply_unified_diff(old: &str, diff: &str) -> Result<String> {
    let old_lines = split_keepends(old);
    let old_len = old_lines.len();

    let lines = split_keepends(diff);
    let mut i = 0;

    // Skip file headers / noise until first hunk.
    while i < lines.len() && !lines[i].starts_with("@@") {
        i += 1;
    }
    if i >= lines.len() {
        return Err(AppError::PatchApply("no hunks found".into()));
    }

    let mut out = String::with_capacity(old.len() + diff.len());
    let mut old_idx = 0usize;

    while i < lines.len() {
        let header = lines[i].trim();
        let parsed = parse_hunk_prefix(header).filter(|&(_, len)| len == header.len());
        let Some((old_start, _)) = parsed else {
            return Err(AppError::PatchApply("invalid hunk header".into()));
        };

        // OLD_START is 1-based but can be 0 in some generators.
        let target = old_start.saturating_sub(1).min(old_len);
        if target < old_idx {
            return Err(AppError::PatchApply("target before current index".into()));
        }

        // Copy unchanged chunk before the hunk.
        for line in &old_lines[old_idx..target] {
            out.push_str(line);
        }
        old_idx = target;
        i += 1;

        let mut body_lines = 0usize;
        while i < lines.len() && !lines[i].starts_with("@@") {
            let ln = lines[i];

            // '\ No newline at end of file' marker: ignore.
            if ln.starts_with('\\') {
                i += 1;
                continue;
            }

            body_lines += 1;

            if let Some(expected) = ln.strip_prefix(' ') {
                if old_idx >= old_len {
                    return Err(AppError::PatchApply("context EOF".into()));
                }
                if old_lines[old_idx] != expected {
                    return Err(AppError::PatchApply("context mismatch".into()));
                }
                out.push_str(old_lines[old_idx]);
                old_idx += 1;
            } else if let Some(expected) = ln.strip_prefix('-') {
                if old_idx >= old_len {
                    return Err(AppError::PatchApply("delete EOF".into()));
                }
                if old_lines[old_idx] != expected {
                    return Err(AppError::PatchApply("delete mismatch".into()));
                }
                old_idx += 1;
            } else if let Some(inserted) = ln.strip_prefix('+') {
                out.push_str(inserted);
            } else {
                return Err(AppError::PatchApply("invalid hunk line".into()));
            }

            i += 1;
        }

        if body_lines == 0 {
            return Err(AppError::PatchApply("empty hunk body".into()));
        }
    }

    for line in &old_lines[old_idx..] {
        out.push_str(line);
    }
    Ok(out)
}

/// Validate a diff destined for an empty file.
///
/// Such a diff must consist purely of insertions: at least one `+` line,
/// no deletions, no context lines.
///
/// # Errors
///
/// Returns `AppError::BadPatchEmptyOld` carrying one of `context_lines`,
/// `deletions`, `invalid_line`, `empty_hunk`, or `no_hunks`.
pub fn validate_insert_only(diff: &str) -> Result<()> {
    let lines = split_keepends(diff);
    let mut i = 0;

    while i < lines.len() && !lines[i].starts_with("@@") {
        i += 1;
    }
    if i >= lines.len() {
        return Err(AppError::BadPatchEmptyOld("no_hunks".into()));
    }

    let mut any_insert = false;
    while i < lines.len() {
        // Hunk header.
        i += 1;

        let mut body_lines = 0usize;
        while i < lines.len() && !lines[i].starts_with("@@") {
            let ln = lines[i];
            if ln.starts_with('\\') {
                i += 1;
                continue;
            }
            body_lines += 1;
            if ln.starts_with('+') {
                any_insert = true;
            } else if ln.starts_with(' ') {
                return Err(AppError::BadPatchEmptyOld("context_lines".into()));
            } else if ln.starts_with('-') {
                return Err(AppError::BadPatchEmptyOld("deletions".into()));
            } else {
                return Err(AppError::BadPatchEmptyOld("invalid_line".into()));
            }
            i += 1;
        }

        if body_lines == 0 {
            return Err(AppError::BadPatchEmptyOld("empty_hunk".into()));
        }
    }

    if !any_insert {
        return Err(AppError::BadPatchEmptyOld("empty_hunk".into()));
    }
    Ok(())
}
