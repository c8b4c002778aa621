//! Unit tests for the syntax probe.

use shellgeist::guards::probe::check_syntax;
use shellgeist::AppError;

#[test]
fn valid_python_passes() {
    let src = "def main() -> int:\n    return 0\n\n\nif __name__ == \"__main__\":\n    main()\n";
    check_syntax("app.py", src).expect("valid python");
}

#[test]
fn broken_python_is_rejected() {
    let src = "def main(:\n    return\n";
    match check_syntax("app.py", src) {
        Err(AppError::GuardBlocked(detail)) => assert_eq!(detail, "syntax_error_after_edit"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn unbalanced_brackets_are_rejected() {
    let src = "items = [1, 2, 3\nprint(items)\n";
    assert!(check_syntax("app.py", src).is_err());
}

#[test]
fn empty_python_file_passes() {
    check_syntax("app.py", "").expect("empty module is valid");
}

#[test]
fn non_python_extensions_pass_unconditionally() {
    check_syntax("notes.txt", "def main(:\n").expect("txt passes");
    check_syntax("script.sh", "if then fi done((\n").expect("sh passes");
    check_syntax("app.pyc", "garbage").expect("pyc is not probed");
}
