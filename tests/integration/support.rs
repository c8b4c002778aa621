//! Shared test doubles for the integration suites.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shellgeist::config::ProfileKind;
use shellgeist::llm::{ChatModel, CompletionFuture, ModelFactory};
use shellgeist::{AppError, Result};

/// Chat model that pops scripted replies and records every call.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ChatModel for ScriptedModel {
    fn complete<'a>(&'a self, system: &'a str, user: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_owned(), user.to_owned()));
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        })
    }
}

/// Factory handing out one shared [`ScriptedModel`] for every profile.
pub struct ScriptedFactory {
    model: Arc<ScriptedModel>,
}

impl ScriptedFactory {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: Arc::new(ScriptedModel {
                replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.model.calls.lock().unwrap().len()
    }

    /// System prompt of the `idx`-th completion call.
    pub fn system_prompt(&self, idx: usize) -> String {
        self.model.calls.lock().unwrap()[idx].0.clone()
    }
}

impl ModelFactory for ScriptedFactory {
    fn build(&self, _kind: ProfileKind) -> Result<Arc<dyn ChatModel>> {
        Ok(Arc::clone(&self.model) as Arc<dyn ChatModel>)
    }
}

/// Model whose every call fails with `http_error`.
struct FailingModel;

impl ChatModel for FailingModel {
    fn complete<'a>(&'a self, _system: &'a str, _user: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move { Err(AppError::Http("status=500 reason=boom".into())) })
    }
}

/// Factory whose clients always fail.
pub struct FailingFactory;

impl ModelFactory for FailingFactory {
    fn build(&self, _kind: ProfileKind) -> Result<Arc<dyn ChatModel>> {
        Ok(Arc::new(FailingModel) as Arc<dyn ChatModel>)
    }
}

/// JSON-encode a diff reply the way a well-behaved model would.
pub fn diff_reply(diff: &str) -> String {
    serde_json::json!({ "diff": diff }).to_string()
}

/// JSON-encode a full-replace reply.
pub fn content_reply(content: &str) -> String {
    serde_json::json!({ "content": content }).to_string()
}
