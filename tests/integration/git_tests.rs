//! Integration tests for the git subprocess wrappers.
//!
//! Each test builds a throwaway repository; every test exits early when
//! no git binary is on the PATH.

use std::fs;
use std::path::Path;
use std::process::Command;

use shellgeist::git;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn init_repo(root: &Path) {
    for args in [
        vec!["init"],
        vec!["config", "user.email", "test@example.com"],
        vec!["config", "user.name", "Test"],
    ] {
        let status = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(&args)
            .output()
            .expect("run git");
        assert!(status.status.success(), "git {args:?} failed");
    }
}

#[tokio::test]
async fn status_reports_untracked_files() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("ws");
    init_repo(ws.path());
    fs::write(ws.path().join("new.txt"), "hi\n").expect("seed");

    let lines = git::status_porcelain(ws.path())
        .await
        .expect("status")
        .expect("inside git");
    assert!(
        lines.iter().any(|l| l.contains("new.txt")),
        "untracked file missing from: {lines:?}"
    );
}

#[tokio::test]
async fn status_outside_git_is_not_an_error() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("ws");

    let status = git::status_porcelain(ws.path()).await.expect("status");
    assert!(status.is_none(), "plain directory is not a repository");
}

#[tokio::test]
async fn add_stages_a_file() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("ws");
    init_repo(ws.path());
    fs::write(ws.path().join("staged.txt"), "hi\n").expect("seed");

    git::add(ws.path(), "staged.txt").await.expect("add");

    let lines = git::status_porcelain(ws.path())
        .await
        .expect("status")
        .expect("inside git");
    assert!(
        lines.iter().any(|l| l.starts_with('A') && l.contains("staged.txt")),
        "file not staged: {lines:?}"
    );
}

#[tokio::test]
async fn add_of_missing_file_fails_with_output() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("ws");
    init_repo(ws.path());

    let err = git::add(ws.path(), "ghost.txt").await.unwrap_err();
    assert_eq!(err.code(), "git_add_failed");
    assert!(!err.detail().is_empty());
}

#[tokio::test]
async fn restore_discards_working_tree_changes() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("ws");
    init_repo(ws.path());
    fs::write(ws.path().join("tracked.txt"), "original\n").expect("seed");

    for args in [vec!["add", "."], vec!["commit", "-m", "seed"]] {
        let out = Command::new("git")
            .arg("-C")
            .arg(ws.path())
            .args(&args)
            .output()
            .expect("run git");
        assert!(out.status.success(), "git {args:?} failed");
    }

    fs::write(ws.path().join("tracked.txt"), "modified\n").expect("modify");
    git::restore(ws.path(), "tracked.txt").await.expect("restore");

    assert_eq!(
        fs::read_to_string(ws.path().join("tracked.txt")).expect("read"),
        "original\n"
    );
}
