use serde::Deserialize;

use crate::error::GENERIC_FAILURE;

/// Wrapper every API response is delivered in.
#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    /// Whether the service considers the call successful.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload. Absent for e.g. deletions.
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Failure body: the service uses `message`, some proxies use `error`.
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Pick the most useful message out of a failed response body.
pub fn extract_error_message(body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let from_error = parsed.error.and_then(|e| match e {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    });

    parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(from_error.filter(|m| !m.trim().is_empty()))
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
