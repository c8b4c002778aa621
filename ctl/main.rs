#![forbid(unsafe_code)]

//! `shellgeist-ctl` — local CLI companion for the `shellgeist` daemon.
//!
//! Connects to the IPC socket, sends one JSON command line, and prints
//! the JSON reply. `debug` is handled locally and prints the resolved
//! environment without touching the daemon.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use interprocess::local_socket::{traits::Stream as _, GenericNamespaced, Stream, ToNsName};

use shellgeist::config::{Config, ProfileKind};

#[derive(Debug, Parser)]
#[command(
    name = "shellgeist-ctl",
    about = "Local CLI for the shellgeist daemon",
    version,
    long_about = None
)]
struct Cli {
    /// IPC socket name (must match the daemon's `ipc_name`).
    #[arg(long, default_value = "shellgeist")]
    ipc_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ping the daemon.
    Ping,

    /// Print resolved environment/profile info as JSON (local, no daemon).
    Debug,

    /// Ask the daemon for an edit plan (unified diff); nothing is written.
    EditPlan {
        /// File path relative to the workspace root.
        file: String,
        /// Edit instruction.
        instruction: String,
        /// Workspace root (default: current directory).
        #[arg(long, short)]
        root: Option<PathBuf>,
    },

    /// Apply a previously produced patch to a file.
    Apply {
        /// File path relative to the workspace root.
        file: String,
        /// Path to a file holding the unified diff.
        #[arg(long)]
        patch_file: PathBuf,
        /// Workspace root (default: current directory).
        #[arg(long, short)]
        root: Option<PathBuf>,
        /// Stage the file with git after writing.
        #[arg(long)]
        stage: bool,
        /// Skip the sibling backup file.
        #[arg(long)]
        no_backup: bool,
    },

    /// Show `git status --porcelain` for the workspace.
    GitStatus {
        /// Workspace root (default: current directory).
        #[arg(long, short)]
        root: Option<PathBuf>,
    },
}

fn main() {
    let args = Cli::parse();

    let request_json = match &args.command {
        Command::Debug => {
            print_debug_info();
            return;
        }
        Command::Ping => serde_json::json!({ "cmd": "ping" }),
        Command::EditPlan {
            file,
            instruction,
            root,
        } => serde_json::json!({
            "cmd": "edit",
            "root": workspace_root(root.clone()),
            "file": file,
            "instruction": instruction,
        }),
        Command::Apply {
            file,
            patch_file,
            root,
            stage,
            no_backup,
        } => {
            let patch = match std::fs::read_to_string(patch_file) {
                Ok(patch) => patch,
                Err(err) => {
                    eprintln!("Failed to read patch file {}: {err}", patch_file.display());
                    std::process::exit(1);
                }
            };
            serde_json::json!({
                "cmd": "edit_apply",
                "root": workspace_root(root.clone()),
                "file": file,
                "patch": patch,
                "stage": *stage,
                "backup": !*no_backup,
            })
        }
        Command::GitStatus { root } => serde_json::json!({
            "cmd": "git_status",
            "root": workspace_root(root.clone()),
        }),
    };

    match send_ipc_command(&args.ipc_name, &request_json) {
        Ok(response) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_default()
            );
            let ok = response
                .get("ok")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            if !ok {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Failed to connect to daemon: {err}");
            eprintln!(
                "Is shellgeist running with ipc_name '{}'?",
                args.ipc_name
            );
            std::process::exit(1);
        }
    }
}

/// Resolve the workspace root argument, defaulting to the current directory.
fn workspace_root(root: Option<PathBuf>) -> String {
    let path = root.unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });
    path.to_string_lossy().into_owned()
}

/// Print the resolved configuration and both model profiles as JSON.
fn print_debug_info() {
    let config = Config::from_env();
    let fast = config.profile(ProfileKind::Fast);
    let smart = config.profile(ProfileKind::Smart);

    let info = serde_json::json!({
        "ok": true,
        "base_url": fast.base_url,
        "api_key_set": !config.api_key.is_empty(),
        "http_timeout_seconds": config.http_timeout_seconds,
        "model_fast": fast.model,
        "model_smart": smart.model,
        "ipc_name": config.ipc_name,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&info).unwrap_or_default()
    );
}

/// Connect to the IPC socket, send a JSON command, and read the response.
fn send_ipc_command(
    ipc_name: &str,
    request: &serde_json::Value,
) -> std::result::Result<serde_json::Value, Box<dyn std::error::Error>> {
    let name = ipc_name.to_ns_name::<GenericNamespaced>()?;
    let mut stream = Stream::connect(name)?;

    // Send request as a single JSON line.
    let mut request_line = serde_json::to_string(request)?;
    request_line.push('\n');
    stream.write_all(request_line.as_bytes())?;
    stream.flush()?;

    // Read response line.
    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader.read_line(&mut response_line)?;

    let response: serde_json::Value = serde_json::from_str(response_line.trim())?;
    Ok(response)
}
