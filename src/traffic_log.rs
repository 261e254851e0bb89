//! Traffic logging for model calls
//!
//! Request and response bodies are truncated so catalog data and chat
//! content do not end up verbatim in logs.

use tracing::{error, trace};

/// Maximum characters to log for content
const MAX_CONTENT_LOG_CHARS: usize = 200;

fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(value: &impl serde::Serialize) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

pub fn log_request(model: &str, request: &impl serde::Serialize) {
    trace!(target: "traffic", model, summary = %summarize(request), "REQUEST");
}

pub fn log_response(model: &str, response: &impl serde::Serialize) {
    trace!(target: "traffic", model, summary = %summarize(response), "RESPONSE");
}

pub fn log_error(model: &str, err: &str) {
    error!(target: "traffic", model, error = err, "ERROR");
}
