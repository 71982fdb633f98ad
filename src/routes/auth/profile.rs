use axum::response::{IntoResponse, Response};

use crate::{responses::JsonResponse, routes::auth::session::AuthSession};

pub async fn handle_profile(AuthSession(user): AuthSession) -> Response {
    JsonResponse::success(user).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::auth::{
        claims::{Claims, TokenUse},
        error::TOKEN_EXPIRED_CODE,
        test_support::{access_cookie_for, build_state, json_body, sample_user},
    };

    #[tokio::test]
    async fn test_profile_returns_public_user() {
        let user = sample_user();
        let (state, _) = build_state(vec![user.clone()]);
        let cookie = access_cookie_for(&state, user.id);
        let app = Router::new()
            .route("/profile", get(handle_profile))
            .with_state(state);

        let res = app
            .oneshot(
                Request::get("/profile")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["id"], user.id.to_string());
        assert_eq!(body["data"]["email"], user.email);
        assert!(body["data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_expired_access_token_is_flagged() {
        let user = sample_user();
        let (state, _) = build_state(vec![user.clone()]);
        let now = Utc::now().timestamp();
        let token = state
            .issuer
            .sign_claims(Claims {
                sub: user.id,
                iat: (now - 1000) as usize,
                exp: (now - 100) as usize,
                iss: String::new(),
                token_use: TokenUse::Access,
            })
            .unwrap();
        let app = Router::new()
            .route("/profile", get(handle_profile))
            .with_state(state);

        let res = app
            .oneshot(
                Request::get("/profile")
                    .header(header::COOKIE, format!("accessToken={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["code"], TOKEN_EXPIRED_CODE);
    }
}
