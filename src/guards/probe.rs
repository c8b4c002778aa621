//! Language-specific syntax probe.
//!
//! The only language-aware gate in the pipeline, and deliberately narrow:
//! `.py` targets are parsed with tree-sitter and rejected when the tree
//! contains error nodes; every other extension passes unconditionally.

use tree_sitter::Parser;

use crate::{AppError, Result};

/// Check that `new` is syntactically valid for the target language.
///
/// # Errors
///
/// Returns `AppError::GuardBlocked` with detail `syntax_error_after_edit`
/// when a `.py` target fails to parse. Returns `AppError::Io` if the
/// parser itself cannot be initialized.
pub fn check_syntax(relpath: &str, new: &str) -> Result<()> {
    if !relpath.ends_with(".py") {
        return Ok(());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| AppError::Io(format!("python grammar unavailable: {err}")))?;

    match parser.parse(new, None) {
        Some(tree) if !tree.root_node().has_error() => Ok(()),
        _ => Err(AppError::GuardBlocked("syntax_error_after_edit".into())),
    }
}
