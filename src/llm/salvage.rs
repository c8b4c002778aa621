//! Best-effort salvage of model JSON output.
//!
//! Models asked for a strict JSON envelope routinely return fenced blocks,
//! stray control bytes, unquoted keys, single-quoted strings, or
//! double-escaped payloads. The salvage pipeline is a sequence of total
//! steps, each with its own precondition, tried in order until one yields
//! a JSON object.

use regex::Regex;
use serde_json::{Map, Value};

use crate::{AppError, Result};

/// Payload fields whose string values get a one-shot unescape pass.
const PAYLOAD_KEYS: &[&str] = &["diff", "text", "content"];

fn fence_re() -> Option<Regex> {
    Regex::new(r"(?i)^\s*```(?:json)?\s*$").ok()
}

/// Strip one outer code fence (```` ``` ```` or ```` ```json ````).
#[must_use]
pub fn strip_code_fences(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return String::new();
    }
    let Some(re) = fence_re() else {
        return s.to_owned();
    };

    let mut lines: Vec<&str> = s.lines().collect();
    if lines.first().is_some_and(|first| re.is_match(first)) {
        lines.remove(0);
        if lines.last().is_some_and(|last| re.is_match(last)) {
            lines.pop();
        }
        return lines.join("\n").trim().to_owned();
    }
    s.to_owned()
}

/// Remove raw control bytes that break JSON parsing (keeps `\t` `\n` `\r`).
fn scrub_control(s: &str) -> String {
    s.chars()
        .filter(|&c| (c as u32) >= 0x20 || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Extract the first balanced `{…}` substring, scanning from the first `{`
/// with a one-pass JSON decoder. Falls back to the last closing brace when
/// the decoder cannot finish.
fn extract_first_object(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let tail = &s[start..];

    let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
    if let Some(Ok(_)) = stream.next() {
        let end = stream.byte_offset();
        return Some(tail[..end].to_owned());
    }

    match s.rfind('}') {
        Some(end) if end > start => Some(s[start..=end].to_owned()),
        _ => Some(s[start..].to_owned()),
    }
}

/// Best-effort repairs for common LLM JSON glitches:
/// unquoted keys (`{diff: …}`), single-quoted keys at object start,
/// single-quoted string values.
fn repair_common_llm_json(s: &str) -> String {
    let mut repaired = scrub_control(s.trim());

    if let Ok(re) = Regex::new(r"\{\s*'([^']+)'\s*:") {
        repaired = re.replace_all(&repaired, "{\"$1\":").into_owned();
    }
    if let Ok(re) = Regex::new(r"([{\s,])([A-Za-z_][A-Za-z0-9_]*)\s*:") {
        repaired = re
            .replace_all(&repaired, |caps: &regex::Captures<'_>| {
                format!("{}\"{}\":", &caps[1], &caps[2])
            })
            .into_owned();
    }
    if let Ok(re) = Regex::new(r":\s*'((?:\\'|[^'])*)'") {
        repaired = re
            .replace_all(&repaired, |caps: &regex::Captures<'_>| {
                let inner = caps[1].replace("\\'", "'").replace('"', "\\\"");
                format!(": \"{inner}\"")
            })
            .into_owned();
    }
    repaired
}

/// Decode backslash escapes once (`\n`, `\t`, `\r`, `\"`, `\\`, `\uXXXX`).
/// Unknown escapes are preserved verbatim; `None` on a truncated escape.
fn decode_escapes(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Some(out)
}

/// If the string carries literal backslash escapes like `\n` or `\"`,
/// unescape once; otherwise return it untouched.
fn unescape_if_looks_escaped(s: &str) -> String {
    if s.contains("\\n") || s.contains("\\t") || s.contains("\\\"") || s.contains("\\r") {
        decode_escapes(s).unwrap_or_else(|| s.to_owned())
    } else {
        s.to_owned()
    }
}

/// Unescape the well-known payload fields in place.
fn postprocess_obj(mut map: Map<String, Value>) -> Map<String, Value> {
    for key in PAYLOAD_KEYS {
        if let Some(Value::String(s)) = map.get(*key) {
            let decoded = unescape_if_looks_escaped(s);
            map.insert((*key).to_owned(), Value::String(decoded));
        }
    }
    map
}

/// Parse model output into a JSON object, repairing what can be repaired.
///
/// # Errors
///
/// Returns `AppError::BadJsonResponse` when no object can be recovered.
pub fn loads_obj(text: &str) -> Result<Map<String, Value>> {
    let raw = scrub_control(&strip_code_fences(text));

    // Fast path.
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw) {
        return Ok(postprocess_obj(map));
    }

    // First balanced object fragment.
    let Some(frag) = extract_first_object(&raw) else {
        return Err(AppError::BadJsonResponse("no json object found".into()));
    };
    let frag = scrub_control(frag.trim());

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&frag) {
        return Ok(postprocess_obj(map));
    }

    // Repair + parse.
    let repaired = repair_common_llm_json(&frag);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Object(map)) => Ok(postprocess_obj(map)),
        Ok(_) => Err(AppError::BadJsonResponse("json_not_object".into())),
        Err(err) => Err(AppError::BadJsonResponse(err.to_string())),
    }
}

/// Regex a trailing `"<key>": "(body)"` out of an unrecoverable envelope.
fn salvage_tail_string(raw: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?s)"{key}"\s*:\s*"(.*)"\s*[}}\]]?\s*\z"#);
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(raw)?;
    decode_escapes(&caps[1])
}

/// Recognize the multi-line shape: first line `{`, second line
/// `"<key>": "`, remaining lines are body until a line that is only `"`
/// or `"}`. Returns the body lines joined with LF.
fn salvage_body_lines(raw: &str, key: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    if lines.len() < 3 || lines[0].trim() != "{" {
        return None;
    }

    let opener = lines[1].trim_start();
    let rest = opener
        .strip_prefix(&format!("\"{key}\": \""))
        .or_else(|| opener.strip_prefix(&format!("\"{key}\":\"")))?;

    let mut body: Vec<&str> = Vec::new();
    if !rest.is_empty() {
        body.push(rest);
    }
    for ln in &lines[2..] {
        let t = ln.trim();
        if t == "\"" || t == "\"}" {
            break;
        }
        body.push(*ln);
    }
    if body.is_empty() {
        return None;
    }
    Some(body.join("\n"))
}

/// Parse model output for the full-replace path. Never fails: after the
/// object pipeline and the content-salvage shapes, the raw (defenced) text
/// itself becomes `{"content": …}`.
#[must_use]
pub fn loads_content(text: &str) -> Map<String, Value> {
    if let Ok(map) = loads_obj(text) {
        return map;
    }

    let raw = scrub_control(&strip_code_fences(text));
    for key in ["content", "diff"] {
        let salvaged =
            salvage_body_lines(&raw, key).or_else(|| salvage_tail_string(&raw, key));
        if let Some(body) = salvaged {
            let mut map = Map::new();
            map.insert(key.to_owned(), Value::String(body));
            return map;
        }
    }

    let mut map = Map::new();
    map.insert("content".to_owned(), Value::String(raw));
    map
}
