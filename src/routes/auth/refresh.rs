use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use crate::{
    responses::JsonResponse,
    state::AppState,
    utils::{
        cookies::{session_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
        jwt::TokenError,
    },
};

/// Trades a valid refresh cookie for a fresh access cookie.
///
/// The refresh token itself is left untouched: it is neither rotated nor
/// revoked, and the user record is not consulted.
pub async fn handle_refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    else {
        return JsonResponse::unauthorized("Unauthorized").into_response();
    };

    let claims = match state.issuer.verify_refresh(&token) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            return JsonResponse::unauthorized("Refresh token expired").into_response()
        }
        Err(err) => {
            debug!(%err, "rejected refresh token");
            return JsonResponse::unauthorized("Invalid refresh token").into_response();
        }
    };

    let access_token = match state.issuer.issue_access(claims.sub) {
        Ok(token) => token,
        Err(err) => {
            error!(%err, user_id = %claims.sub, "failed to mint access token");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    debug!(user_id = %claims.sub, "access token refreshed");
    let jar = jar.add(session_cookie(
        ACCESS_COOKIE,
        access_token,
        state.issuer.access_ttl(),
        state.config.auth_cookie_secure,
    ));
    (jar, JsonResponse::success("Token refreshed successfully")).into_response()
}
