//! Local IPC server for edit and git commands.
//!
//! Listens on a named pipe (Windows) or Unix domain socket (Linux/macOS)
//! using the `interprocess` crate. Accepts line-delimited JSON requests
//! and replies with one JSON object per line.
//!
//! ## Protocol
//!
//! Request (one JSON object per line):
//! ```json
//! {"cmd": "ping"}
//! {"cmd": "edit", "root": "/work", "file": "src/app.py", "instruction": "add logging"}
//! {"cmd": "edit_apply", "root": "/work", "file": "src/app.py", "patch": "@@ … @@", "stage": true}
//! ```
//!
//! Response (one JSON object per line):
//! ```json
//! {"type": "result", "ok": true, ...}
//! {"type": "result", "ok": false, "error": "missing_root"}
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use interprocess::local_socket::{tokio::prelude::*, GenericNamespaced, ListenerOptions};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::edit::driver::edit_plan;
use crate::edit::handlers::{apply_edit, apply_full_replace};
use crate::edit::EditOutcome;
use crate::llm::ModelFactory;
use crate::{git, plan, AppError, Result};

/// Shared state handed to every request handler.
pub struct ServerState {
    /// Daemon configuration.
    pub config: Config,
    /// Factory for model clients, injected so tests can script replies.
    pub factory: Arc<dyn ModelFactory>,
}

/// Spawn the IPC server task.
///
/// # Errors
///
/// Returns `AppError::Ipc` if the listener cannot be created.
pub fn spawn_ipc_server(
    state: Arc<ServerState>,
    ct: CancellationToken,
) -> Result<tokio::task::JoinHandle<()>> {
    let name = state.config.ipc_name.clone();

    let listener_name = name
        .clone()
        .to_ns_name::<GenericNamespaced>()
        .map_err(|err| AppError::Ipc(format!("invalid ipc socket name '{name}': {err}")))?;

    let listener = ListenerOptions::new()
        .name(listener_name)
        .create_tokio()
        .map_err(|err| AppError::Ipc(format!("failed to create ipc listener: {err}")))?;

    info!(ipc_name = %name, "IPC server listening");

    let handle = tokio::spawn(async move {
        let span = info_span!("ipc_server", name = %name);
        async move {
            loop {
                tokio::select! {
                    () = ct.cancelled() => {
                        info!("IPC server shutting down");
                        break;
                    }
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok(stream) => {
                                let state = Arc::clone(&state);
                                tokio::spawn(handle_connection(stream, state));
                            }
                            Err(err) => {
                                warn!(%err, "IPC accept failed");
                            }
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;
    });

    Ok(handle)
}

/// Handle a single IPC client connection.
async fn handle_connection(
    stream: interprocess::local_socket::tokio::Stream,
    state: Arc<ServerState>,
) {
    let span = info_span!("ipc_conn");
    async move {
        let (reader, mut writer) = stream.split();
        let mut buf_reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            match buf_reader.read_line(&mut line).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let response = match serde_json::from_str::<Value>(trimmed) {
                        Ok(request) => {
                            // A panicking handler must not take the
                            // connection down; it surfaces as handler_crash.
                            let task_state = Arc::clone(&state);
                            match tokio::spawn(async move {
                                dispatch_request(request, &task_state).await
                            })
                            .await
                            {
                                Ok(value) => value,
                                Err(err) => json!({
                                    "type": "result",
                                    "ok": false,
                                    "error": "handler_crash",
                                    "detail": err.to_string(),
                                }),
                            }
                        }
                        Err(_) => result_err("bad_json"),
                    };

                    let mut response_line = serde_json::to_string(&response).unwrap_or_else(|_| {
                        r#"{"type":"result","ok":false,"error":"internal_error"}"#.to_owned()
                    });
                    response_line.push('\n');

                    if let Err(err) = writer.write_all(response_line.as_bytes()).await {
                        warn!(%err, "failed to write ipc response");
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "ipc read error");
                    break;
                }
            }
        }

        info!("IPC connection closed");
    }
    .instrument(span)
    .await;
}

fn result_err(error: &str) -> Value {
    json!({ "type": "result", "ok": false, "error": error })
}

fn error_envelope(err: &AppError) -> Value {
    let mut value = json!({ "type": "result", "ok": false, "error": err.code() });
    let detail = err.detail();
    if !detail.is_empty() {
        value["detail"] = json!(detail);
    }
    value
}

fn outcome_envelope(outcome: &EditOutcome) -> Value {
    match serde_json::to_value(outcome) {
        Ok(Value::Object(mut map)) => {
            map.insert("type".to_owned(), json!("result"));
            Value::Object(map)
        }
        _ => result_err("internal_error"),
    }
}

/// Extract and validate the workspace root from a request.
fn require_root(req: &Value) -> std::result::Result<PathBuf, Value> {
    let root = req
        .get("root")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| result_err("missing_root"))?;

    match Path::new(root).canonicalize() {
        Ok(path) if path.is_dir() => Ok(path),
        _ => Err(result_err("invalid_root")),
    }
}

/// Extract a required non-empty string field.
fn require_str<'a>(req: &'a Value, key: &str, error: &str) -> std::result::Result<&'a str, Value> {
    req.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| result_err(error))
}

/// Optional string field with a default.
fn str_or<'a>(req: &'a Value, key: &str, default: &'a str) -> &'a str {
    req.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

fn bool_or(req: &Value, key: &str, default: bool) -> bool {
    req.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Route a parsed request to its handler and build the reply envelope.
async fn dispatch_request(req: Value, state: &Arc<ServerState>) -> Value {
    let Some(cmd) = req
        .get("cmd")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
    else {
        return result_err("unknown_cmd");
    };

    let span = info_span!("request", cmd = %cmd);
    async move {
        match cmd.as_str() {
            "ping" => json!({ "type": "result", "ok": true }),

            "git_status" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                match git::status_porcelain(&root).await {
                    Ok(Some(lines)) => json!({
                        "type": "result", "ok": true,
                        "inside_git": true, "porcelain": lines,
                    }),
                    // Outside a git repo (or any git failure) stays ok=true
                    // so the UI can render an empty status.
                    Ok(None) => json!({
                        "type": "result", "ok": true,
                        "inside_git": false, "porcelain": [],
                    }),
                    Err(err) => error_envelope(&err),
                }
            }

            "git_add" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let file = match require_str(&req, "file", "missing_file") {
                    Ok(file) => file,
                    Err(reply) => return reply,
                };
                match git::add(&root, file).await {
                    Ok(()) => json!({ "type": "result", "ok": true }),
                    Err(err) => error_envelope(&err),
                }
            }

            "git_restore" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let file = match require_str(&req, "file", "missing_file") {
                    Ok(file) => file,
                    Err(reply) => return reply,
                };
                match git::restore(&root, file).await {
                    Ok(()) => json!({ "type": "result", "ok": true }),
                    Err(err) => error_envelope(&err),
                }
            }

            "plan" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let goal = match require_str(&req, "goal", "missing_goal") {
                    Ok(goal) => goal,
                    Err(reply) => return reply,
                };
                let steps = plan::plan(goal, &root);
                match serde_json::to_value(steps) {
                    Ok(steps) => json!({ "type": "result", "ok": true, "steps": steps }),
                    Err(_) => result_err("internal_error"),
                }
            }

            "shell" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let task = match require_str(&req, "task", "missing_task") {
                    Ok(task) => task,
                    Err(reply) => return reply,
                };
                let commands = plan::plan_shell(task, &root);
                let blocked: Vec<String> = commands
                    .iter()
                    .filter(|c| plan::is_blocked(c.as_str()))
                    .cloned()
                    .collect();
                json!({
                    "type": "result", "ok": true,
                    "commands": commands, "blocked": blocked,
                })
            }

            "edit" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let file = match require_str(&req, "file", "missing_file") {
                    Ok(file) => file,
                    Err(reply) => return reply,
                };
                let instruction = match require_str(&req, "instruction", "missing_instruction") {
                    Ok(instruction) => instruction,
                    Err(reply) => return reply,
                };
                let outcome = edit_plan(file, instruction, &root, state.factory.as_ref()).await;
                outcome_envelope(&outcome)
            }

            "edit_apply" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let file = match require_str(&req, "file", "missing_file") {
                    Ok(file) => file,
                    Err(reply) => return reply,
                };
                let patch = match require_str(&req, "patch", "missing_patch") {
                    Ok(patch) if patch.contains("@@") => patch,
                    _ => return result_err("missing_patch"),
                };
                let instruction = str_or(&req, "instruction", "apply");
                let stage = bool_or(&req, "stage", false);
                let backup = bool_or(&req, "backup", true);

                let outcome =
                    apply_edit(file, patch, &root, instruction, stage, backup).await;
                outcome_envelope(&outcome)
            }

            "edit_apply_full" => {
                let root = match require_root(&req) {
                    Ok(root) => root,
                    Err(reply) => return reply,
                };
                let file = match require_str(&req, "file", "missing_file") {
                    Ok(file) => file,
                    Err(reply) => return reply,
                };
                let text = match require_str(&req, "text", "missing_text") {
                    Ok(text) => text,
                    Err(reply) => return reply,
                };
                let instruction = str_or(&req, "instruction", "apply_full");
                let stage = bool_or(&req, "stage", false);
                let backup = bool_or(&req, "backup", true);

                let outcome =
                    apply_full_replace(file, text, &root, instruction, stage, backup).await;
                outcome_envelope(&outcome)
            }

            _ => result_err("unknown_cmd"),
        }
    }
    .instrument(span)
    .await
}
