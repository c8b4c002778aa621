//! Unit tests for the error taxonomy and its wire identifiers.

use shellgeist::AppError;

#[test]
fn codes_are_stable_identifiers() {
    let cases = [
        (AppError::InvalidPath("x".into()), "invalid_path"),
        (AppError::PathEscape("x".into()), "path_escape"),
        (AppError::FileNotFound("x".into()), "file_not_found"),
        (AppError::InvalidPatch("x".into()), "invalid_patch"),
        (AppError::InvalidContent("x".into()), "invalid_content"),
        (AppError::BadPatchEmptyOld("x".into()), "bad_patch_empty_old"),
        (AppError::PatchApply("x".into()), "patch_apply_failed"),
        (AppError::GuardBlocked("x".into()), "guard_blocked"),
        (AppError::Http("x".into()), "http_error"),
        (AppError::BadJsonResponse("x".into()), "bad_json_response"),
        (AppError::BadOpenAiSchema("x".into()), "bad_openai_schema"),
        (AppError::GitAdd("x".into()), "git_add_failed"),
        (AppError::GitRestore("x".into()), "git_restore_failed"),
        (AppError::Config("x".into()), "internal_error"),
        (AppError::Ipc("x".into()), "internal_error"),
        (AppError::Io("x".into()), "internal_error"),
    ];
    for (err, code) in cases {
        assert_eq!(err.code(), code, "wrong code for {err:?}");
    }
}

#[test]
fn detail_round_trips_the_payload() {
    let err = AppError::PatchApply("context mismatch".into());
    assert_eq!(err.detail(), "context mismatch");
}

#[test]
fn guard_display_uses_the_guard_prefix() {
    let err = AppError::GuardBlocked("control_chars".into());
    assert_eq!(err.to_string(), "guard: control_chars");
}

#[test]
fn errors_implement_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::Http("boom".into()));
    assert!(err.to_string().contains("boom"));
}
