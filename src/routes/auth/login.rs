use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{error, info};

use crate::{
    models::{
        signup::{normalize_email, LoginPayload},
        user::PublicUser,
    },
    responses::JsonResponse,
    state::AppState,
    utils::{
        cookies::set_session_cookies,
        password::{verify_dummy_password, verify_password},
    },
};

// Unknown email and wrong password must be indistinguishable.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = normalize_email(&payload.email);
    let user = match state.db.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            verify_dummy_password(&payload.password);
            return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
        }
        Err(err) => {
            error!(?err, "failed to look up user for login");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            error!(%err, user_id = %user.id, "stored password hash is unreadable");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    }

    let pair = match state.issuer.issue_pair(user.id) {
        Ok(pair) => pair,
        Err(err) => {
            error!(%err, user_id = %user.id, "failed to issue credentials");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    info!(user_id = %user.id, "user logged in");
    let jar = set_session_cookies(jar, pair, &state.issuer, state.config.auth_cookie_secure);
    (
        jar,
        JsonResponse::success(json!({ "user": PublicUser::from(&user) })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::auth::test_support::{
        build_state, json_body, sample_user, set_cookies, PASSWORD,
    };

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/login", post(handle_login))
            .with_state(state)
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": email, "password": password}).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_login_sets_cookies() {
        let user = sample_user();
        let (state, _) = build_state(vec![user.clone()]);

        let res = build_app(state)
            .oneshot(login_request("TESTER@example.com", PASSWORD))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let cookies = set_cookies(&res);
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
        assert!(cookies.iter().all(|c| c.contains("Secure")));

        let body = json_body(res).await;
        assert_eq!(body["data"]["user"]["id"], user.id.to_string());
        assert_eq!(body["data"]["user"]["name"], user.name);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let user = sample_user();
        let (state, _) = build_state(vec![user.clone()]);
        let app = build_app(state);

        let wrong_password = app
            .clone()
            .oneshot(login_request(&user.email, "not-the-password"))
            .await
            .unwrap();
        let unknown_email = app
            .oneshot(login_request("ghost@example.com", PASSWORD))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&wrong_password).is_empty());
        assert!(set_cookies(&unknown_email).is_empty());

        let expected = json!({"status": "fail", "data": "Invalid email or password"});
        assert_eq!(json_body(wrong_password).await, expected);
        assert_eq!(json_body(unknown_email).await, expected);
    }

    #[tokio::test]
    async fn test_db_failure_returns_500() {
        let (mut state, _) = build_state(vec![]);
        state.db = std::sync::Arc::new(crate::db::mock_db::MockDb::failing());

        let res = build_app(state)
            .oneshot(login_request("tester@example.com", PASSWORD))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
