//! Diff canonicalization.
//!
//! Model-produced diffs arrive with `diff --git` noise, file headers, CRLF
//! line endings, and occasionally a hunk header and its first body line
//! fused onto one physical line. Normalization reduces all of that to the
//! hunks-only canonical form consumed by the applier.

use super::apply::parse_hunk_prefix;

/// Canonicalize a unified diff to hunks-only form.
///
/// - Converts CRLF and lone CR to LF.
/// - Drops file headers and `diff --git` / `index` noise lines.
/// - Splits a hunk header fused with its first body operation
///   (`@@ … @@ +foo`) into two lines.
/// - Ensures a trailing LF.
///
/// When the input contains no `@@` at all, the newline-converted text is
/// returned unchanged; the caller treats that as "no diff".
#[must_use]
pub fn normalize_diff(diff: &str) -> String {
    let unified = diff.replace("\r\n", "\n").replace('\r', "\n");
    if !unified.contains("@@") {
        return unified;
    }

    let mut out = String::with_capacity(unified.len());
    for line in unified.lines() {
        if line.starts_with("diff --git ")
            || line.starts_with("index ")
            || line.starts_with("--- ")
            || line.starts_with("+++ ")
        {
            continue;
        }

        if line.starts_with("@@") {
            if let Some((_, header_len)) = parse_hunk_prefix(line) {
                let tail = &line[header_len..];
                if !tail.is_empty() {
                    // One space separates the header from a fused body
                    // operation; anything else (e.g. git function context)
                    // is left alone for the applier to reject.
                    let op = tail.strip_prefix(' ').unwrap_or(tail);
                    if op.starts_with(['+', '-', '\\', ' ']) {
                        out.push_str(&line[..header_len]);
                        out.push('\n');
                        out.push_str(op);
                        out.push('\n');
                        continue;
                    }
                }
            }
        }

        out.push_str(line);
        out.push('\n');
    }
    out
}
