//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// Every variant maps to one of the stable wire identifiers via
/// [`AppError::code`]; the payload string is the human-readable detail
/// surfaced alongside the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Request path is empty, absolute, or home-relative.
    InvalidPath(String),
    /// Resolved path escapes the workspace root.
    PathEscape(String),
    /// Target file does not exist.
    FileNotFound(String),
    /// Submitted patch is not a usable unified diff.
    InvalidPatch(String),
    /// Submitted replacement content is unusable.
    InvalidContent(String),
    /// Patch against an empty file contained non-insertion lines.
    BadPatchEmptyOld(String),
    /// Patch application failed; payload names the hunk-level cause.
    PatchApply(String),
    /// Content guard rejected the proposed new contents.
    GuardBlocked(String),
    /// Model HTTP call failed (transport, timeout, or non-2xx status).
    Http(String),
    /// Model HTTP response body was not valid JSON.
    BadJsonResponse(String),
    /// Model HTTP response JSON did not match the chat-completions schema.
    BadOpenAiSchema(String),
    /// `git add` exited non-zero.
    GitAdd(String),
    /// `git restore` exited non-zero.
    GitRestore(String),
    /// IPC listener or socket failure.
    Ipc(String),
    /// File-system or subprocess I/O failure.
    Io(String),
}

impl AppError {
    /// Stable wire identifier for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "invalid_path",
            Self::PathEscape(_) => "path_escape",
            Self::FileNotFound(_) => "file_not_found",
            Self::InvalidPatch(_) => "invalid_patch",
            Self::InvalidContent(_) => "invalid_content",
            Self::BadPatchEmptyOld(_) => "bad_patch_empty_old",
            Self::PatchApply(_) => "patch_apply_failed",
            Self::GuardBlocked(_) => "guard_blocked",
            Self::Http(_) => "http_error",
            Self::BadJsonResponse(_) => "bad_json_response",
            Self::BadOpenAiSchema(_) => "bad_openai_schema",
            Self::GitAdd(_) => "git_add_failed",
            Self::GitRestore(_) => "git_restore_failed",
            Self::Config(_) | Self::Ipc(_) | Self::Io(_) => "internal_error",
        }
    }

    /// Human-readable detail carried by this error.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::InvalidPath(msg)
            | Self::PathEscape(msg)
            | Self::FileNotFound(msg)
            | Self::InvalidPatch(msg)
            | Self::InvalidContent(msg)
            | Self::BadPatchEmptyOld(msg)
            | Self::PatchApply(msg)
            | Self::GuardBlocked(msg)
            | Self::Http(msg)
            | Self::BadJsonResponse(msg)
            | Self::BadOpenAiSchema(msg)
            | Self::GitAdd(msg)
            | Self::GitRestore(msg)
            | Self::Ipc(msg)
            | Self::Io(msg) => msg,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::InvalidPath(msg) => write!(f, "invalid path: {msg}"),
            Self::PathEscape(msg) => write!(f, "path escape: {msg}"),
            Self::FileNotFound(msg) => write!(f, "file not found: {msg}"),
            Self::InvalidPatch(msg) => write!(f, "invalid patch: {msg}"),
            Self::InvalidContent(msg) => write!(f, "invalid content: {msg}"),
            Self::BadPatchEmptyOld(msg) => write!(f, "bad patch for empty file: {msg}"),
            Self::PatchApply(msg) => write!(f, "patch apply failed: {msg}"),
            Self::GuardBlocked(msg) => write!(f, "guard: {msg}"),
            Self::Http(msg) => write!(f, "http error: {msg}"),
            Self::BadJsonResponse(msg) => write!(f, "bad json response: {msg}"),
            Self::BadOpenAiSchema(msg) => write!(f, "bad openai schema: {msg}"),
            Self::GitAdd(msg) => write!(f, "git add failed: {msg}"),
            Self::GitRestore(msg) => write!(f, "git restore failed: {msg}"),
            Self::Ipc(msg) => write!(f, "ipc: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}
