//! The edit driver: prompt the model for a diff, validate it through the
//! safe-edit pipeline, repair or fall back when it misbehaves.
//!
//! Flow: up to two diff rounds (the second carrying the first round's
//! failure as a repair hint), one guard-repair call when finalize rejects,
//! and a terminal full-replace fallback whose rejection is returned
//! verbatim.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, info_span, Instrument};

use crate::config::ProfileKind;
use crate::diff::{apply_unified_diff, normalize_diff, resolve_request_path, validate_insert_only};
use crate::edit::finalize::{finalize_contents, rebuild_patch};
use crate::edit::{prompts, read_source, EditOutcome};
use crate::guards::has_future_import;
use crate::llm::{salvage, ClientCache, ModelFactory};
use crate::{AppError, Result};

/// Number of main diff rounds before the full-replace fallback.
const MAX_DIFF_ROUNDS: usize = 2;

/// Produce a validated edit plan for `file` under `root`.
///
/// Never unwinds: every failure is folded into the returned envelope.
pub async fn edit_plan(
    file: &str,
    instruction: &str,
    root: &Path,
    factory: &dyn ModelFactory,
) -> EditOutcome {
    let span = info_span!("edit_plan", file);
    async move {
        match edit_plan_inner(file, instruction, root, factory).await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(%err, "edit plan failed");
                EditOutcome::failure(&err, Some(file), None)
            }
        }
    }
    .instrument(span)
    .await
}

async fn edit_plan_inner(
    file: &str,
    instruction: &str,
    root: &Path,
    factory: &dyn ModelFactory,
) -> Result<EditOutcome> {
    let abs = resolve_request_path(root, file)?;
    let old = read_source(&abs)?;

    let mut clients = ClientCache::new(factory);
    let mut repair_hint: Option<String> = None;

    for round in 0..MAX_DIFF_ROUNDS {
        debug!(round, "requesting diff");
        let system =
            prompts::diff_system_prompt(old.is_empty(), has_future_import(&old), repair_hint.as_deref());
        let user = prompts::edit_user_prompt(file, instruction, &old);
        let raw = clients
            .get(ProfileKind::Smart)?
            .complete(&system, &user)
            .await?;

        let Ok(obj) = salvage::loads_obj(&raw) else {
            return full_replace(file, instruction, &old, &mut clients, "missing_diff").await;
        };
        let Some(diff_text) = obj.get("diff").and_then(Value::as_str) else {
            return full_replace(file, instruction, &old, &mut clients, "missing_diff").await;
        };

        let patch = normalize_diff(diff_text);
        if !patch.contains("@@") {
            return full_replace(file, instruction, &old, &mut clients, "missing_diff").await;
        }

        if old.is_empty() {
            if let Err(err) = validate_insert_only(&patch) {
                let reason = format!("bad_diff_empty_old: {}", err.detail());
                return full_replace(file, instruction, &old, &mut clients, &reason).await;
            }
        }

        let new = match apply_unified_diff(&old, &patch) {
            Ok(new) => new,
            Err(err) => {
                repair_hint = Some(format!("patch_apply_failed: {}", err.detail()));
                continue;
            }
        };

        return match finalize_contents(file, instruction, &old, new, patch.clone()) {
            Ok(finalized) => Ok(EditOutcome::planned(file, finalized.patch, finalized.diff)),
            Err(first) => {
                guard_repair_round(file, instruction, &old, &mut clients, &first, patch).await
            }
        };
    }

    let reason = repair_hint.unwrap_or_else(|| "missing_diff".to_owned());
    full_replace(file, instruction, &old, &mut clients, &reason).await
}

/// One extra model call after a guard rejection, with a targeted hint.
///
/// When the first violation was a violent-rewrite block, the first
/// rejection is surfaced even if the repair attempt passes.
async fn guard_repair_round(
    file: &str,
    instruction: &str,
    old: &str,
    clients: &mut ClientCache<'_>,
    first: &AppError,
    first_patch: String,
) -> Result<EditOutcome> {
    let hint = prompts::guard_repair_hint(first.detail());
    let system = prompts::diff_system_prompt(old.is_empty(), has_future_import(old), Some(&hint));
    let user = prompts::edit_user_prompt(file, instruction, old);

    let rejection = EditOutcome::failure(first, Some(file), Some(first_patch));

    let Ok(raw) = clients.get(ProfileKind::Smart)?.complete(&system, &user).await else {
        return Ok(rejection);
    };

    let surface_first = first.detail().contains("rewrite too violent");
    match attempt_diff(file, instruction, old, &raw) {
        Ok(outcome) if !surface_first => Ok(outcome),
        _ => Ok(rejection),
    }
}

/// Run one raw model reply through the full diff pipeline.
fn attempt_diff(file: &str, instruction: &str, old: &str, raw: &str) -> Result<EditOutcome> {
    let obj = salvage::loads_obj(raw)?;
    let diff_text = obj
        .get("diff")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidPatch("model returned no diff".into()))?;

    let patch = normalize_diff(diff_text);
    if !patch.contains("@@") {
        return Err(AppError::InvalidPatch("patch contains no hunks".into()));
    }
    if old.is_empty() {
        validate_insert_only(&patch)?;
    }
    let new = apply_unified_diff(old, &patch)?;
    let finalized = finalize_contents(file, instruction, old, new, patch)?;
    Ok(EditOutcome::planned(file, finalized.patch, finalized.diff))
}

/// Terminal fallback: ask for the complete new file instead of a diff.
async fn full_replace(
    file: &str,
    instruction: &str,
    old: &str,
    clients: &mut ClientCache<'_>,
    reason: &str,
) -> Result<EditOutcome> {
    info!(reason, "falling back to full replace");

    let system = prompts::full_replace_system_prompt(reason, has_future_import(old));
    let user = prompts::edit_user_prompt(file, instruction, old);
    let raw = clients
        .get(ProfileKind::Smart)?
        .complete(&system, &user)
        .await?;

    let obj = salvage::loads_content(&raw);
    let content = obj
        .get("content")
        .and_then(Value::as_str)
        .or_else(|| obj.get("text").and_then(Value::as_str))
        .ok_or_else(|| AppError::InvalidContent("model returned no content".into()))?;

    let new = content.to_owned();
    let patch = rebuild_patch(old, &new);

    match finalize_contents(file, instruction, old, new, patch.clone()) {
        Ok(finalized) => Ok(EditOutcome::planned(file, finalized.patch, finalized.diff)),
        // This is the terminal path; its rejection is returned verbatim.
        Err(err) => Ok(EditOutcome::failure(&err, Some(file), Some(patch))),
    }
}
