//! Prompt construction for the edit driver.

/// Hint appended when the target file is empty.
pub const EMPTY_OLD_HINT: &str = "OLD IS EMPTY. Only + lines. No context lines.";

/// Hint appended when the target file carries `from __future__ import`.
pub const FUTURE_IMPORT_HINT: &str = "The file contains `from __future__ import` lines. \
     They must remain the first statement, preceded only by comments and the module docstring.";

/// System prompt for a diff round.
#[must_use]
pub fn diff_system_prompt(
    old_is_empty: bool,
    has_future_import: bool,
    repair_hint: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "You are a precise code editor. Reply with strict JSON and nothing else: \
         {\"diff\": \"<unified diff>\"}.\n\
         The diff patches exactly one file and uses \
         @@ -OLD_START,OLD_LEN +NEW_START,NEW_LEN @@ hunk headers with \
         ' ' context lines, '-' deletions, and '+' insertions. \
         Context and deletion lines must match the file byte-for-byte. \
         Change only what the instruction requires. No commentary, no code fences.",
    );
    if old_is_empty {
        prompt.push_str("\n\n");
        prompt.push_str(EMPTY_OLD_HINT);
    }
    if has_future_import {
        prompt.push_str("\n\n");
        prompt.push_str(FUTURE_IMPORT_HINT);
    }
    if let Some(hint) = repair_hint {
        prompt.push_str("\n\nYour previous attempt was rejected: ");
        prompt.push_str(hint);
    }
    prompt
}

/// System prompt for the full-replace fallback.
#[must_use]
pub fn full_replace_system_prompt(reason: &str, has_future_import: bool) -> String {
    let mut prompt = String::from(
        "You are a precise code editor. Reply with strict JSON and nothing else: \
         {\"content\": \"<the complete new file>\"}.\n\
         Return the entire file after applying the instruction, not a diff. \
         Change only what the instruction requires. No commentary, no code fences.",
    );
    if has_future_import {
        prompt.push_str("\n\n");
        prompt.push_str(FUTURE_IMPORT_HINT);
    }
    prompt.push_str("\n\nA diff-based attempt was rejected: ");
    prompt.push_str(reason);
    prompt
}

/// User prompt shared by diff rounds and the full-replace fallback.
#[must_use]
pub fn edit_user_prompt(relpath: &str, instruction: &str, old: &str) -> String {
    format!(
        "File: {relpath}\nInstruction: {instruction}\n\n--- BEGIN FILE ---\n{old}\n--- END FILE ---\n"
    )
}

/// Repair hint for a guard rejection, keyed on the guard detail.
#[must_use]
pub fn guard_repair_hint(detail: &str) -> String {
    if detail.contains("rewrite too violent") {
        "MINIMAL diff only; change nothing unrelated; do not reformat or reorder imports \
         or rename identifiers."
            .to_owned()
    } else {
        format!("guard_blocked: {detail}")
    }
}
