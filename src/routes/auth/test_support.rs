//! Shared fixtures for the handler tests.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::Response;
use chrono::Duration;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    config::Config,
    db::mock_db::MockDb,
    models::user::{User, UserRole},
    routes::auth::issuer::CredentialIssuer,
    state::AppState,
    utils::password::HashedPassword,
};

pub const ACCESS_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const REFRESH_SECRET: &str = "fedcba9876543210fedcba9876543210";
pub const PASSWORD: &str = "secret123";

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        frontend_origin: "http://localhost".into(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        access_token_secret: ACCESS_SECRET.into(),
        refresh_token_secret: REFRESH_SECRET.into(),
        auth_cookie_secure: true,
        jwt_issuer: "test-issuer".into(),
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(7),
        rate_limit_auth_seconds: 1,
        rate_limit_auth_burst: 10,
    }
}

pub fn build_state(users: Vec<User>) -> (AppState, Arc<MockDb>) {
    let config = test_config();
    let db = Arc::new(MockDb {
        users: std::sync::Mutex::new(users),
        ..Default::default()
    });
    let issuer = CredentialIssuer::from_config(&config).expect("test secrets should be valid");

    let state = AppState {
        db: db.clone(),
        cart_repo: db.clone(),
        coupon_repo: db.clone(),
        product_repo: db.clone(),
        issuer: Arc::new(issuer),
        config: Arc::new(config),
    };
    (state, db)
}

pub fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Session Tester".into(),
        email: "tester@example.com".into(),
        password_hash: HashedPassword::new(PASSWORD).unwrap().as_str().to_string(),
        role: UserRole::Customer,
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn sample_admin() -> User {
    User {
        name: "Store Admin".into(),
        email: "admin@example.com".into(),
        role: UserRole::Admin,
        ..sample_user()
    }
}

/// A `Cookie` header value carrying a fresh access token for `user_id`.
pub fn access_cookie_for(state: &AppState, user_id: Uuid) -> String {
    let token = state.issuer.issue_access(user_id).unwrap();
    format!("accessToken={token}")
}

pub fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn json_body(res: Response<Body>) -> Value {
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
