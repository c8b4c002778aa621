//! External entry points for applying a validated patch or a full
//! replacement to the working tree.
//!
//! Both handlers re-run the complete verification sequence — normalize,
//! apply, autofix, syntax probe, guards — before committing anything,
//! then write atomically with an optional sibling backup and optionally
//! stage the file in version control.

use std::path::Path;

use tracing::{info, info_span, Instrument};

use crate::diff::{
    apply_unified_diff, normalize_diff, resolve_request_path, validate_insert_only, write_atomic,
};
use crate::edit::finalize::{finalize_contents, rebuild_patch};
use crate::edit::{read_source, EditOutcome};
use crate::{git, AppError, Result};

/// Apply a unified diff to `file` under `root`.
///
/// Never unwinds: every failure is folded into the returned envelope.
pub async fn apply_edit(
    file: &str,
    patch: &str,
    root: &Path,
    instruction: &str,
    stage: bool,
    backup: bool,
) -> EditOutcome {
    let span = info_span!("apply_edit", file, stage, backup);
    async move {
        match apply_edit_inner(file, patch, root, instruction, stage, backup).await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(%err, "apply failed");
                EditOutcome::failure(&err, Some(file), None)
            }
        }
    }
    .instrument(span)
    .await
}

async fn apply_edit_inner(
    file: &str,
    patch: &str,
    root: &Path,
    instruction: &str,
    stage: bool,
    backup: bool,
) -> Result<EditOutcome> {
    let abs = resolve_request_path(root, file)?;
    if !abs.is_file() {
        return Err(AppError::FileNotFound(file.to_owned()));
    }
    if !patch.contains("@@") {
        return Err(AppError::InvalidPatch("patch contains no hunks".into()));
    }

    let old = read_source(&abs)?;
    let normalized = normalize_diff(patch);
    if old.is_empty() {
        validate_insert_only(&normalized)?;
    }

    let new = apply_unified_diff(&old, &normalized)?;
    let finalized = finalize_contents(file, instruction, &old, new, normalized)?;

    write_atomic(&abs, &finalized.new, backup)?;

    let staged = if stage {
        git::add(root, file).await?;
        true
    } else {
        false
    };

    Ok(EditOutcome::applied(
        file,
        finalized.patch,
        finalized.diff,
        staged,
    ))
}

/// Replace the entire contents of `file` under `root` with `text`.
///
/// The patch returned to the client is the computed diff from the old
/// contents to `text`. Never unwinds.
pub async fn apply_full_replace(
    file: &str,
    text: &str,
    root: &Path,
    instruction: &str,
    stage: bool,
    backup: bool,
) -> EditOutcome {
    let span = info_span!("apply_full_replace", file, stage, backup);
    async move {
        match apply_full_replace_inner(file, text, root, instruction, stage, backup).await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(%err, "full replace failed");
                EditOutcome::failure(&err, Some(file), None)
            }
        }
    }
    .instrument(span)
    .await
}

async fn apply_full_replace_inner(
    file: &str,
    text: &str,
    root: &Path,
    instruction: &str,
    stage: bool,
    backup: bool,
) -> Result<EditOutcome> {
    let abs = resolve_request_path(root, file)?;
    if !abs.is_file() {
        return Err(AppError::FileNotFound(file.to_owned()));
    }
    if text.is_empty() {
        return Err(AppError::InvalidContent("replacement text is empty".into()));
    }

    let old = read_source(&abs)?;
    let patch = rebuild_patch(&old, text);
    let finalized = finalize_contents(file, instruction, &old, text.to_owned(), patch)?;

    write_atomic(&abs, &finalized.new, backup)?;

    let staged = if stage {
        git::add(root, file).await?;
        true
    } else {
        false
    };

    Ok(EditOutcome::applied(
        file,
        finalized.patch,
        finalized.diff,
        staged,
    ))
}
