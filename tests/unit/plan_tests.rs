//! Unit tests for plan placeholders and the dangerous-command screen.

use std::path::Path;

use shellgeist::plan::{is_blocked, plan, plan_shell, PlanStep};

#[test]
fn plan_names_the_goal() {
    let steps = plan("ship v2", Path::new("/tmp"));
    assert_eq!(steps.len(), 2);
    match &steps[0] {
        PlanStep::Edit { file, instruction } => {
            assert_eq!(file, "README.md");
            assert!(instruction.contains("ship v2"));
        }
        other => panic!("expected an edit step, got {other:?}"),
    }
}

#[test]
fn shell_plan_echoes_the_task() {
    let commands = plan_shell("compress logs", Path::new("/tmp"));
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains("compress logs"));
}

#[test]
fn destructive_commands_are_blocked() {
    assert!(is_blocked("rm -rf /"));
    assert!(is_blocked("sudo RM -RF /home"));
    assert!(is_blocked("dd if=/dev/zero of=/dev/sda"));
    assert!(is_blocked(":(){:|:&};:"));
}

#[test]
fn ordinary_commands_pass() {
    assert!(!is_blocked("ls -la"));
    assert!(!is_blocked("cargo build"));
    assert!(!is_blocked("rm build.log"));
}

#[test]
fn plan_steps_serialize_with_kind_tags() {
    let json = serde_json::to_value(plan("x", Path::new("/tmp"))).expect("serialize");
    assert_eq!(json[0]["kind"], "edit");
    assert_eq!(json[1]["kind"], "shell");
}
