use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::{responses::JsonResponse, utils::jwt::TokenError};

pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";
pub const UNAUTHENTICATED_CODE: &str = "UNAUTHENTICATED";

/// Failure modes of resolving a session from the access cookie.
///
/// `Expired` is kept apart from `Unauthenticated` so a client can tell that a
/// refresh, rather than a new login, may recover the session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no valid credential presented")]
    Unauthenticated,
    #[error("credential expired")]
    Expired,
    #[error("credential refers to a missing user")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::Expired,
            TokenError::Invalid(_) | TokenError::WrongUse => AuthError::Unauthenticated,
            TokenError::Encode(err) => AuthError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated => {
                JsonResponse::unauthorized_with_code("You are not logged in", UNAUTHENTICATED_CODE)
                    .into_response()
            }
            AuthError::Expired => {
                JsonResponse::unauthorized_with_code("Token expired", TOKEN_EXPIRED_CODE)
                    .into_response()
            }
            AuthError::NotFound => JsonResponse::not_found("User not found").into_response(),
            AuthError::Internal(detail) => {
                tracing::error!(%detail, "session resolution failed");
                JsonResponse::server_error("Internal server error").into_response()
            }
        }
    }
}
