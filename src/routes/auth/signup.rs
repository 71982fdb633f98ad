use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    db::is_unique_violation,
    models::{signup::SignupPayload, user::PublicUser},
    responses::JsonResponse,
    state::AppState,
    utils::{cookies::set_session_cookies, password::HashedPassword},
};

const USER_EXISTS: &str = "User already exists";

pub async fn handle_signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignupPayload>,
) -> Response {
    payload.normalize();
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    match state.db.is_email_taken(&payload.email).await {
        Ok(true) => return JsonResponse::bad_request(USER_EXISTS).into_response(),
        Ok(false) => {}
        Err(err) => {
            error!(?err, "failed to check email availability");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    }

    let hashed = match HashedPassword::new(&payload.password) {
        Ok(hashed) => hashed,
        Err(err) => {
            error!(%err, "password hashing failed");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    let user = match state
        .db
        .create_user(&payload.name, &payload.email, &hashed)
        .await
    {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            warn!("signup lost a race on a duplicate email");
            return JsonResponse::bad_request(USER_EXISTS).into_response();
        }
        Err(err) => {
            error!(?err, "failed to create user");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    let pair = match state.issuer.issue_pair(user.id) {
        Ok(pair) => pair,
        Err(err) => {
            error!(%err, user_id = %user.id, "failed to issue credentials");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    info!(user_id = %user.id, "user signed up");
    let jar = set_session_cookies(jar, pair, &state.issuer, state.config.auth_cookie_secure);
    (
        jar,
        JsonResponse::created(json!({ "user": PublicUser::from(&user) })),
    )
        .into_response()
}
