//! Error types for the Montage API client

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for API exchanges
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a single HTTP exchange
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The request never produced a response (connect, timeout, body I/O)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Decode(_) => None,
        }
    }

    /// Whether the exchange hit the client's per-request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Build a status error from a raw response payload
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self::Status {
            status,
            message: error_message(status, body),
        }
    }
}

/// Fields checked for a human-readable message, most specific first.
const MESSAGE_FIELDS: [&str; 4] = ["detail", "message", "error", "non_field_errors"];

/// Extract a human-readable message from an error payload.
///
/// Looks at `detail`, `message`, `error` and `non_field_errors` in that
/// order. Falls back to the raw payload, then to the status reason phrase
/// when the body is empty.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        for field in MESSAGE_FIELDS {
            if let Some(text) = map.get(field).and_then(render_message) {
                return text;
            }
        }
    }

    if !raw.is_empty() {
        return raw.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn render_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_preferred() {
        let body = br#"{"message": "second", "detail": "first"}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, body), "first");
    }

    #[test]
    fn test_field_order() {
        let body = br#"{"error": "third", "message": "second"}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, body), "second");

        let body = br#"{"non_field_errors": ["a", "b"], "error": "third"}"#;
        assert_eq!(error_message(StatusCode::BAD_REQUEST, body), "third");
    }

    #[test]
    fn test_non_field_errors_joined() {
        let body = br#"{"non_field_errors": ["Invalid credentials", "Try again"]}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid credentials, Try again"
        );
    }

    #[test]
    fn test_raw_payload_fallback() {
        let body = br#"{"email": ["Email is already registered"]}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            r#"{"email": ["Email is already registered"]}"#
        );

        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"upstream down\n"),
            "upstream down"
        );
    }

    #[test]
    fn test_empty_body_uses_reason() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, b""), "Not Found");
    }

    #[test]
    fn test_non_string_detail_rendered() {
        let body = br#"{"detail": {"code": 7}}"#;
        assert_eq!(error_message(StatusCode::CONFLICT, body), r#"{"code":7}"#);
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, br#"{"detail": "nope"}"#);
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.to_string(), "403 Forbidden: nope");
        assert!(!err.is_timeout());
    }
}
