use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::responses::JsonResponse;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        code: Option<String>,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Fail { status: u16, message: String },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Session refresh failed: {0}")]
    RefreshFailed(Arc<ClientError>),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ClientError {
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Maps a non-success response to an error, reading the message and code
    /// out of the `{status, data, code}` envelope when the body carries one.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let (message, code) = match serde_json::from_str::<JsonResponse<Value>>(body) {
            Ok(envelope) => {
                let message = match envelope.data {
                    Value::String(message) => message,
                    other => other.to_string(),
                };
                (message, envelope.code)
            }
            Err(_) => (Self::truncate_body(body), None),
        };

        match status.as_u16() {
            401 => ClientError::Unauthorized { message, code },
            404 => ClientError::NotFound(message),
            500..=599 => ClientError::Server(message),
            400..=499 => ClientError::Fail {
                status: status.as_u16(),
                message,
            },
            _ => ClientError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// The `code` the server attached to a 401, if any.
    pub fn auth_code(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { code, .. } => code.as_deref(),
            ClientError::RefreshFailed(inner) => inner.auth_code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn reads_envelope_message_and_code() {
        let err = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"status":"fail","data":"Token expired","code":"TOKEN_EXPIRED"}"#,
        );
        match &err {
            ClientError::Unauthorized { message, code } => {
                assert_eq!(message, "Token expired");
                assert_eq!(code.as_deref(), Some("TOKEN_EXPIRED"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.auth_code(), Some("TOKEN_EXPIRED"));
    }

    #[test]
    fn maps_statuses() {
        let body = r#"{"status":"fail","data":"Coupon not found"}"#;
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, body),
            ClientError::NotFound(msg) if msg == "Coupon not found"
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, body),
            ClientError::Fail { status: 400, .. }
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "<html>"),
            ClientError::Server(msg) if msg == "<html>"
        ));
    }

    #[test]
    fn truncates_long_plain_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        match ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ClientError::Server(msg) => assert!(msg.contains("truncated")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
