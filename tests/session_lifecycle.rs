//! Drives the real router over HTTP with the bundled client.

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{extract::Request, middleware, middleware::Next};
use chrono::{Duration, Utc};
use time::OffsetDateTime;
use tokio::net::TcpListener;
use uuid::Uuid;

use storefront_backend::{
    client::{cart_store::ProductSummary, ApiClient, ClientError},
    models::product::NewProductPayload,
    config::Config,
    db::mock_db::MockDb,
    models::user::{User, UserRole},
    routes::{
        app_router,
        auth::{
            claims::{Claims, TokenUse},
            issuer::CredentialIssuer,
        },
    },
    utils::{
        jwt::{create_jwt, JwtKeys},
        password::HashedPassword,
    },
    AppState,
};

const ACCESS_SECRET: &str = "0123456789abcdef0123456789abcdef";
const REFRESH_SECRET: &str = "fedcba9876543210fedcba9876543210";
const ISSUER: &str = "lifecycle-test";
const EMAIL: &str = "shopper@example.com";
const ADMIN_EMAIL: &str = "admin@example.com";
const PASSWORD: &str = "secret123";

struct Server {
    addr: SocketAddr,
    refresh_hits: Arc<AtomicUsize>,
}

impl Server {
    fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    fn refreshes(&self) -> usize {
        self.refresh_hits.load(Ordering::SeqCst)
    }
}

async fn spawn_server() -> Server {
    let config = Config {
        database_url: String::new(),
        frontend_origin: "http://localhost:5173".into(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        access_token_secret: ACCESS_SECRET.into(),
        refresh_token_secret: REFRESH_SECRET.into(),
        auth_cookie_secure: false,
        jwt_issuer: ISSUER.into(),
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(7),
        rate_limit_auth_seconds: 1,
        rate_limit_auth_burst: 10,
    };
    let issuer = CredentialIssuer::from_config(&config).unwrap();

    let shopper = User {
        id: Uuid::new_v4(),
        name: "Shopper".into(),
        email: EMAIL.into(),
        password_hash: HashedPassword::new(PASSWORD).unwrap().as_str().to_string(),
        role: UserRole::Customer,
        created_at: OffsetDateTime::now_utc(),
    };
    let admin = User {
        id: Uuid::new_v4(),
        name: "Admin".into(),
        email: ADMIN_EMAIL.into(),
        role: UserRole::Admin,
        ..shopper.clone()
    };
    let db = Arc::new(MockDb::with_user(shopper));
    db.users.lock().unwrap().push(admin);
    let state = AppState {
        db: db.clone(),
        cart_repo: db.clone(),
        coupon_repo: db.clone(),
        product_repo: db,
        issuer: Arc::new(issuer),
        config: Arc::new(config),
    };

    let refresh_hits = Arc::new(AtomicUsize::new(0));
    let hits = refresh_hits.clone();
    let app = app_router(state).layer(middleware::from_fn(move |req: Request, next: Next| {
        let hits = hits.clone();
        async move {
            if req.uri().path() == "/api/auth/refresh-token" {
                hits.fetch_add(1, Ordering::SeqCst);
            }
            next.run(req).await
        }
    }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server { addr, refresh_hits }
}

/// An access token for `user_id` that expired a minute ago.
fn expired_access_token(user_id: Uuid) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: (now - 1000) as usize,
        exp: (now - 60) as usize,
        iss: String::new(),
        token_use: TokenUse::Access,
    };
    create_jwt(claims, &JwtKeys::from_secret(ACCESS_SECRET).unwrap(), ISSUER).unwrap()
}

fn plant_cookie(client: &ApiClient, cookie: &str) {
    client
        .jar()
        .add_cookie_str(&format!("{cookie}; Path=/"), client.base_url());
}

#[tokio::test]
async fn concurrent_expiry_triggers_exactly_one_refresh() {
    let server = spawn_server().await;
    let client = ApiClient::new(&server.api_url()).unwrap();

    let user = client.login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(client.users().snapshot().user.as_ref(), Some(&user));

    let product = ProductSummary {
        id: Uuid::new_v4(),
        name: "Mug".into(),
        price_cents: 1500,
    };
    client.add_to_cart(product.clone()).await.unwrap();

    plant_cookie(&client, &format!("accessToken={}", expired_access_token(user.id)));

    let (a, b, c) = tokio::join!(
        client.get_cart(),
        client.get_cart(),
        client.check_auth(),
    );

    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap()[0].product_id, product.id);
    assert_eq!(c, Some(user));
    assert_eq!(server.refreshes(), 1);

    // The refreshed cookie keeps working without another round-trip.
    client.get_cart().await.unwrap();
    assert_eq!(server.refreshes(), 1);
}

#[tokio::test]
async fn largest_quantity_round_trips_through_the_envelope() {
    let server = spawn_server().await;
    let client = ApiClient::new(&server.api_url()).unwrap();
    client.login(EMAIL, PASSWORD).await.unwrap();

    let product = ProductSummary {
        id: Uuid::new_v4(),
        name: "Mug".into(),
        price_cents: 1500,
    };
    client.add_to_cart(product.clone()).await.unwrap();

    let items = client
        .update_quantity(product.id, i32::MAX)
        .await
        .unwrap();
    assert_eq!(items[0].quantity, i32::MAX);
    assert_eq!(
        client.cart().snapshot().lines[0].quantity,
        i64::from(i32::MAX)
    );

    let err = client.update_quantity(product.id, -1).await.unwrap_err();
    assert!(matches!(err, ClientError::Fail { status: 400, .. }));
}

#[tokio::test]
async fn failed_refresh_logs_the_client_out() {
    let server = spawn_server().await;
    let client = ApiClient::new(&server.api_url()).unwrap();

    let user = client.login(EMAIL, PASSWORD).await.unwrap();
    plant_cookie(&client, &format!("accessToken={}", expired_access_token(user.id)));
    plant_cookie(&client, "refreshToken=not-a-token");

    let (a, b) = tokio::join!(client.get_cart(), client.get_cart());

    for result in [a, b] {
        match result {
            Err(ClientError::RefreshFailed(inner)) => {
                assert!(matches!(*inner, ClientError::Unauthorized { .. }));
            }
            other => panic!("expected refresh failure, got {other:?}"),
        }
    }
    assert_eq!(server.refreshes(), 1);
    assert!(client.users().snapshot().user.is_none());
}

#[tokio::test]
async fn signup_coupon_and_logout_round_trip() {
    let server = spawn_server().await;
    let client = ApiClient::new(&server.api_url()).unwrap();

    let err = client
        .signup("New", "new@example.com", "secret123", "mismatch1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let user = client
        .signup("New", "new@example.com", "secret123", "secret123")
        .await
        .unwrap();
    assert_eq!(client.check_auth().await, Some(user));

    let err = client.validate_coupon("GIFTNOPE00").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(msg) if msg == "Coupon not found"));

    client.logout().await.unwrap();
    assert!(client.users().snapshot().user.is_none());
    assert_eq!(client.check_auth().await, None);
    assert_eq!(server.refreshes(), 1);
}

#[tokio::test]
async fn admin_curates_the_catalog_customers_only_read_it() {
    let server = spawn_server().await;
    let admin = ApiClient::new(&server.api_url()).unwrap();
    let shopper = ApiClient::new(&server.api_url()).unwrap();
    admin.login(ADMIN_EMAIL, PASSWORD).await.unwrap();
    shopper.login(EMAIL, PASSWORD).await.unwrap();

    let lamp = admin
        .create_product(&NewProductPayload {
            name: "Lamp".into(),
            description: "Warm light".into(),
            price_cents: 4200,
            image: String::new(),
            category: "home".into(),
        })
        .await
        .unwrap();
    let lamp = admin.toggle_featured_product(lamp.id).await.unwrap();
    assert!(lamp.is_featured);
    assert_eq!(admin.products().snapshot().products, vec![lamp.clone()]);

    let err = shopper.toggle_featured_product(lamp.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Fail { status: 403, .. }));
    let err = shopper.fetch_all_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Fail { status: 403, .. }));

    let featured = shopper.fetch_featured_products().await.unwrap();
    assert_eq!(featured, vec![lamp.clone()]);
    assert_eq!(shopper.fetch_products_by_category("home").await.unwrap().len(), 1);

    shopper
        .add_to_cart(ProductSummary::from(&featured[0]))
        .await
        .unwrap();
    assert_eq!(shopper.cart().snapshot().subtotal_cents, 4200);

    admin.delete_product(lamp.id).await.unwrap();
    assert!(admin.products().snapshot().products.is_empty());
    assert!(shopper.fetch_featured_products().await.unwrap().is_empty());
    assert_eq!(server.refreshes(), 0);
}
