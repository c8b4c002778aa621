//! Version-control integration: a thin `git add` / `git restore` pair
//! plus porcelain status, all invoked as subprocesses.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::{AppError, Result};

/// Cap on combined stdout+stderr echoed into error details.
const OUTPUT_CAP: usize = 8000;

/// Run `git -C <root> <args>` and capture combined output.
async fn run_git(root: &Path, args: &[&str]) -> Result<(i32, String)> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| AppError::Io(format!("failed to execute git: {err}")))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let exit_code = output.status.code().unwrap_or(-1);

    debug!(?args, exit_code, "git invocation complete");
    Ok((exit_code, combined))
}

/// Stage `rel` in the index.
///
/// # Errors
///
/// Returns `AppError::GitAdd` with the captured output when git exits
/// non-zero.
pub async fn add(root: &Path, rel: &str) -> Result<()> {
    let (code, out) = run_git(root, &["add", "--", rel]).await?;
    if code != 0 {
        return Err(AppError::GitAdd(truncate_output(&out, OUTPUT_CAP)));
    }
    Ok(())
}

/// Restore `rel` from the index, discarding working-tree changes.
///
/// # Errors
///
/// Returns `AppError::GitRestore` with the captured output when git exits
/// non-zero.
pub async fn restore(root: &Path, rel: &str) -> Result<()> {
    let (code, out) = run_git(root, &["restore", "--", rel]).await?;
    if code != 0 {
        return Err(AppError::GitRestore(truncate_output(&out, OUTPUT_CAP)));
    }
    Ok(())
}

/// `git status --porcelain` for `root`.
///
/// Returns `None` when `root` is not inside a git repository (any git
/// failure is treated that way, which keeps the UI usable outside git).
///
/// # Errors
///
/// Returns `AppError::Io` only when the git binary itself cannot be
/// spawned.
pub async fn status_porcelain(root: &Path) -> Result<Option<Vec<String>>> {
    let (code, out) = run_git(root, &["status", "--porcelain"]).await?;
    if code != 0 {
        return Ok(None);
    }
    let lines = out
        .lines()
        .filter(|ln| !ln.trim().is_empty())
        .map(ToOwned::to_owned)
        .collect();
    Ok(Some(lines))
}

/// Truncate to a maximum byte length on a char boundary.
fn truncate_output(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_owned();
    }
    let boundary = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_len)
        .last()
        .unwrap_or(0);
    format!("{}... ({} bytes total)", &s[..boundary], s.len())
}
