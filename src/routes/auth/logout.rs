use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{responses::JsonResponse, state::AppState, utils::cookies::clear_session_cookies};

/// Overwrites both session cookies. Works without a session so a client with
/// a dead refresh token can still clean up.
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let jar = clear_session_cookies(jar, state.config.auth_cookie_secure);
    (jar, JsonResponse::success("Logged out successfully")).into_response()
}
