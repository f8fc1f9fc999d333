//! Minimal GET client for JSON APIs

use indexmap::IndexMap;
use serde_json::{Value, json};
use std::fmt::Write as _;
use thiserror::Error;

use crate::settings::display_value;

/// Indentation added per nesting level by [`format_simple`]
pub const SIMPLE_INDENT: usize = 5;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// GET request built from a base URL and query pairs
///
/// Pairs whose value is `None` are left out. The API key pair, when given,
/// always comes last.
#[derive(Debug, Clone)]
pub struct ApiCall {
    base_url: String,
    api_key: Option<(String, Option<String>)>,
    params: IndexMap<String, Option<String>>,
}

impl ApiCall {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            params: IndexMap::new(),
        }
    }

    pub fn api_key(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.api_key = Some((name.into(), value));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.params.insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn key(&self) -> Option<&(String, Option<String>)> {
        self.api_key.as_ref()
    }

    /// Endpoint with the encoded query string
    pub fn url(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .collect();
        if let Some((name, value)) = &self.api_key {
            pairs.push((name.as_str(), value.as_deref().unwrap_or("")));
        }

        if pairs.is_empty() {
            return self.base_url.clone();
        }

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let joiner = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.base_url, joiner, query)
    }

    /// Raw response body
    pub fn fetch(&self) -> Result<String, ApiError> {
        let url = self.url();
        log::debug!("GET {}", url);

        let request_error = |reason: String| ApiError::Request {
            url: url.clone(),
            reason,
        };

        let mut response = ureq::get(&url).call().map_err(|e| request_error(e.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| request_error(e.to_string()))
    }

    /// Parsed response, or an `{error, detail}` object when the call or the
    /// parse fails
    pub fn response_json(&self) -> Value {
        let body = match self.fetch() {
            Ok(body) => body,
            Err(e) => {
                log::debug!("{}", e);
                return json!({
                    "error": "Request failed",
                    "detail": e.to_string(),
                });
            }
        };

        match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Response is not JSON: {}", e);
                json!({
                    "error": "Invalid data",
                    "detail": "Unable to parse the return format. It seems like it is not a JSON response.",
                })
            }
        }
    }

    /// Response as JSON indented by four spaces
    pub fn response_pretty(&self) -> String {
        pretty_json(&self.response_json())
    }

    /// Response as an indented bullet list
    pub fn response_simple(&self) -> String {
        format_simple(&self.response_json())
    }
}

pub fn pretty_json(value: &Value) -> String {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Render JSON as `• key: value` lines, nesting by [`SIMPLE_INDENT`] spaces
///
/// Array items are keyed by their 1-based position.
pub fn format_simple(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(_) | Value::Array(_) => write_simple(&mut out, value, 0),
        scalar => out.push_str(&display_value(scalar)),
    }
    out.trim_end().to_string()
}

fn write_simple(out: &mut String, value: &Value, depth: usize) {
    let pad = " ".repeat(depth * SIMPLE_INDENT);
    let items: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(list) => list.iter().enumerate().map(|(i, v)| ((i + 1).to_string(), v)).collect(),
        _ => return,
    };

    for (key, item) in items {
        match item {
            Value::Object(m) if !m.is_empty() => {
                let _ = writeln!(out, "{}• {}:", pad, key);
                write_simple(out, item, depth + 1);
            }
            Value::Array(l) if !l.is_empty() => {
                let _ = writeln!(out, "{}• {}:", pad, key);
                write_simple(out, item, depth + 1);
            }
            other => {
                let _ = writeln!(out, "{}• {}: {}", pad, key, display_value(other));
            }
        }
    }
}
