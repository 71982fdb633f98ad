use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

/// The `{status, data}` envelope every endpoint answers with. `fail` marks a
/// client error (4xx), `error` a server error (5xx).
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = Value> {
    pub status: ResponseStatus,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl JsonResponse {
    pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                status: ResponseStatus::Success,
                data,
                code: None,
            }),
        )
    }

    pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
        (
            StatusCode::CREATED,
            Json(JsonResponse {
                status: ResponseStatus::Success,
                data,
                code: None,
            }),
        )
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::fail(StatusCode::BAD_REQUEST, msg, None)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::fail(StatusCode::UNAUTHORIZED, msg, None)
    }

    pub fn unauthorized_with_code(msg: &str, code: &str) -> impl IntoResponse {
        Self::fail(StatusCode::UNAUTHORIZED, msg, Some(code))
    }

    pub fn forbidden(msg: &str) -> impl IntoResponse {
        Self::fail(StatusCode::FORBIDDEN, msg, None)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::fail(StatusCode::NOT_FOUND, msg, None)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::fail(StatusCode::TOO_MANY_REQUESTS, msg, None)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonResponse {
                status: ResponseStatus::Error,
                data: Value::String(msg.to_string()),
                code: None,
            }),
        )
    }

    fn fail(status: StatusCode, msg: &str, code: Option<&str>) -> impl IntoResponse {
        (
            status,
            Json(JsonResponse {
                status: ResponseStatus::Fail,
                data: Value::String(msg.to_string()),
                code: code.map(str::to_string),
            }),
        )
    }
}
