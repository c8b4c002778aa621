//! OpenAI-compatible chat-completions client.
//!
//! One operation: `POST {base_url}/chat/completions` with a two-message
//! body and Bearer auth, `stream: false`. Works against Ollama's
//! OpenAI-compatible server and any other compliant endpoint.

use std::time::Duration;

use serde_json::Value;

use crate::config::ModelProfile;
use crate::llm::{ChatModel, CompletionFuture};
use crate::{AppError, Result};

/// Cap on response-body bytes echoed into error messages.
const ERROR_BODY_CAP: usize = 2000;

/// HTTP client bound to one resolved model profile.
pub struct HttpChatClient {
    http: reqwest::Client,
    profile: ModelProfile,
}

impl HttpChatClient {
    /// Build a client for the given profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(profile: ModelProfile) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(profile.timeout)
            .build()
            .map_err(|err| AppError::Http(format!("failed to build http client: {err}")))?;
        Ok(Self { http, profile })
    }

    async fn complete_inner(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.profile.base_url);
        let body = serde_json::json!({
            "model": self.profile.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "stream": false,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.profile.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::Http(err.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| AppError::Http(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            return Err(AppError::Http(format!(
                "status={} reason={} body={}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                truncate_output(&raw, ERROR_BODY_CAP),
            )));
        }

        let data: Value = serde_json::from_str(&raw).map_err(|err| {
            AppError::BadJsonResponse(format!(
                "{err} raw={}",
                truncate_output(&raw, ERROR_BODY_CAP)
            ))
        })?;

        let content = data
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"));

        match content {
            Some(Value::String(text)) => Ok(text.clone()),
            // Some backends send an explicit null for an empty completion.
            Some(Value::Null) => Ok(String::new()),
            _ => Err(AppError::BadOpenAiSchema(format!(
                "raw={}",
                truncate_output(&raw, ERROR_BODY_CAP)
            ))),
        }
    }
}

impl ChatModel for HttpChatClient {
    fn complete<'a>(&'a self, system: &'a str, user: &'a str) -> CompletionFuture<'a> {
        Box::pin(self.complete_inner(system, user))
    }
}

/// Truncate to a maximum byte length on a char boundary.
fn truncate_output(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_owned();
    }
    let boundary = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_len)
        .last()
        .unwrap_or(0);
    format!("{}... ({} bytes total)", &s[..boundary], s.len())
}
