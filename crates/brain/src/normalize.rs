use crate::GenerateError;
use regex::Regex;
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("valid regex"));
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid regex"));

const PREVIEW_CHARS: usize = 120;

/// Removes markdown code fences, keeping their contents.
pub fn strip_code_fences(content: &str) -> String {
    let without_json = JSON_FENCE.replace_all(content, "$1");
    ANY_FENCE.replace_all(&without_json, "$1").into_owned()
}

/// Turns a raw model reply into a JSON value.
pub fn normalize_reply(raw: &str) -> Result<serde_json::Value, GenerateError> {
    let normalized = strip_code_fences(raw);
    let normalized = normalized.trim();
    serde_json::from_str(normalized).map_err(|_| GenerateError::InvalidJson {
        preview: normalized.chars().take(PREVIEW_CHARS).collect(),
    })
}
