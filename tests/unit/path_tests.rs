//! Unit tests for request-path resolution.

use std::path::Path;

use shellgeist::diff::resolve_request_path;
use shellgeist::AppError;

fn workspace() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp workspace")
}

#[test]
fn resolves_path_inside_workspace() {
    let ws = workspace();
    std::fs::create_dir_all(ws.path().join("src")).expect("mkdir");
    std::fs::write(ws.path().join("src/lib.rs"), "x").expect("seed");

    let resolved = resolve_request_path(ws.path(), "src/lib.rs").expect("resolve");
    assert!(resolved.ends_with(Path::new("src/lib.rs")));
    let canonical_ws = ws.path().canonicalize().expect("canonicalize ws");
    assert!(resolved.starts_with(&canonical_ws));
}

#[test]
fn resolves_missing_file_to_absolute_candidate() {
    let ws = workspace();
    let resolved = resolve_request_path(ws.path(), "not/yet/here.txt").expect("resolve");
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with(Path::new("not/yet/here.txt")));
}

#[test]
fn rejects_empty_path() {
    let ws = workspace();
    assert!(matches!(
        resolve_request_path(ws.path(), ""),
        Err(AppError::InvalidPath(_))
    ));
    assert!(matches!(
        resolve_request_path(ws.path(), "   "),
        Err(AppError::InvalidPath(_))
    ));
}

#[test]
fn rejects_absolute_path() {
    let ws = workspace();
    assert!(matches!(
        resolve_request_path(ws.path(), "/etc/passwd"),
        Err(AppError::InvalidPath(_))
    ));
}

#[test]
fn rejects_home_relative_path() {
    let ws = workspace();
    assert!(matches!(
        resolve_request_path(ws.path(), "~/secrets"),
        Err(AppError::InvalidPath(_))
    ));
}

#[test]
fn rejects_parent_traversal() {
    let ws = workspace();
    assert!(matches!(
        resolve_request_path(ws.path(), "../outside.txt"),
        Err(AppError::PathEscape(_))
    ));
    assert!(matches!(
        resolve_request_path(ws.path(), "a/../../outside.txt"),
        Err(AppError::PathEscape(_))
    ));
}

#[test]
fn inner_parent_segments_are_normalized() {
    let ws = workspace();
    let resolved = resolve_request_path(ws.path(), "a/b/../c.txt").expect("resolve");
    assert!(resolved.ends_with(Path::new("a/c.txt")));
}

#[cfg(unix)]
#[test]
fn rejects_symlink_escape() {
    let ws = workspace();
    let outside = tempfile::tempdir().expect("outside dir");
    std::fs::write(outside.path().join("target.txt"), "secret").expect("seed");

    std::os::unix::fs::symlink(outside.path().join("target.txt"), ws.path().join("link.txt"))
        .expect("symlink");

    assert!(matches!(
        resolve_request_path(ws.path(), "link.txt"),
        Err(AppError::PathEscape(_))
    ));
}
