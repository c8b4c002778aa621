//! Unit tests for the atomic writer and its sibling backups.

use std::fs;

use shellgeist::diff::{write_atomic, BACKUP_SUFFIX};

fn workspace() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp workspace")
}

#[test]
fn creates_new_file() {
    let ws = workspace();
    let target = ws.path().join("fresh.txt");

    let summary = write_atomic(&target, "hello\n", false).expect("write");

    assert_eq!(fs::read_to_string(&target).expect("read back"), "hello\n");
    assert_eq!(summary.bytes_written, 6);
    assert_eq!(summary.path, target);
}

#[test]
fn creates_parent_directories() {
    let ws = workspace();
    let target = ws.path().join("deep/nested/dir/file.txt");

    write_atomic(&target, "x", false).expect("write");

    assert!(target.exists());
}

#[test]
fn overwrites_existing_file() {
    let ws = workspace();
    let target = ws.path().join("existing.txt");
    fs::write(&target, "old content").expect("seed");

    write_atomic(&target, "new content\n", false).expect("write");

    assert_eq!(fs::read_to_string(&target).expect("read back"), "new content\n");
}

#[test]
fn backup_preserves_prior_contents() {
    let ws = workspace();
    let target = ws.path().join("app.py");
    fs::write(&target, "version one\n").expect("seed");

    write_atomic(&target, "version two\n", true).expect("write");

    let backup = ws.path().join(format!("app.py{BACKUP_SUFFIX}"));
    assert_eq!(fs::read_to_string(&backup).expect("backup"), "version one\n");
    assert_eq!(fs::read_to_string(&target).expect("target"), "version two\n");
}

#[test]
fn backup_skipped_for_new_file() {
    let ws = workspace();
    let target = ws.path().join("brand_new.txt");

    write_atomic(&target, "contents\n", true).expect("write");

    let backup = ws.path().join(format!("brand_new.txt{BACKUP_SUFFIX}"));
    assert!(!backup.exists(), "no backup for a file that did not exist");
}

#[test]
fn backup_disabled_leaves_no_sibling() {
    let ws = workspace();
    let target = ws.path().join("quiet.txt");
    fs::write(&target, "before").expect("seed");

    write_atomic(&target, "after", false).expect("write");

    let backup = ws.path().join(format!("quiet.txt{BACKUP_SUFFIX}"));
    assert!(!backup.exists());
}

#[test]
fn leaves_no_temp_files_behind() {
    let ws = workspace();
    let target = ws.path().join("clean.txt");

    write_atomic(&target, "data", false).expect("write");

    let entries: Vec<_> = fs::read_dir(ws.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    assert_eq!(entries.len(), 1, "unexpected siblings: {entries:?}");
}
