//! Goal planning and shell planning (placeholder contracts), plus the
//! dangerous-command screen applied to shell plans.

use std::path::Path;

use serde::Serialize;

/// One step of a plan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStep {
    /// Edit a file per instruction.
    Edit {
        /// Workspace-relative target file.
        file: String,
        /// Edit instruction.
        instruction: String,
    },
    /// Run a shell command.
    Shell {
        /// The command line.
        command: String,
    },
}

/// Plan steps toward a goal. Placeholder: a fixed roadmap edit plus a
/// docs directory.
#[must_use]
pub fn plan(goal: &str, _root: &Path) -> Vec<PlanStep> {
    vec![
        PlanStep::Edit {
            file: "README.md".to_owned(),
            instruction: format!("Add Roadmap about: {goal}"),
        },
        PlanStep::Shell {
            command: "mkdir -p docs".to_owned(),
        },
    ]
}

/// Shell commands toward a task. Placeholder.
#[must_use]
pub fn plan_shell(task: &str, _root: &Path) -> Vec<String> {
    vec![format!("echo 'TODO shell plan for {task}'")]
}

/// Shell fragments considered too dangerous to surface unscreened.
pub const BLOCKED_PATTERNS: &[&str] = &[
    "rm -rf",
    "mkfs",
    "dd if=",
    "passwd",
    "visudo",
    ">/etc/sudoers",
    ">>/etc/sudoers",
    "useradd ",
    "userdel ",
    ":(){:|:&};:", // fork bomb
    "chown -R /",
    "chmod -R 7",
];

/// True when the command contains a blocked fragment.
#[must_use]
pub fn is_blocked(cmd: &str) -> bool {
    let lower = cmd.to_lowercase();
    BLOCKED_PATTERNS.iter().any(|p| lower.contains(p))
}
