use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::response::IntoResponse;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_backend::{
    config::Config,
    db::{
        cart_repository::CartRepository, coupon_repository::CouponRepository,
        postgres_cart_repository::PostgresCartRepository,
        postgres_coupon_repository::PostgresCouponRepository,
        postgres_product_repository::PostgresProductRepository,
        postgres_user_repository::PostgresUserRepository, product_repository::ProductRepository,
        user_repository::UserRepository,
    },
    responses::JsonResponse,
    routes::{api_router, auth_routes, auth::issuer::CredentialIssuer},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    info!(?config, "configuration loaded");
    let issuer = CredentialIssuer::from_config(&config).context("invalid token secrets")?;

    let pg_pool = establish_connection(&config.database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("failed to run migrations")?;

    // Stricter limiter for /api/auth/*
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_auth_seconds)
            .burst_size(config.rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter settings")?,
    );

    let governor_limiter = auth_governor_conf.limiter().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            governor_limiter.retain_recent();
        }
    });

    let bind_addr = config.bind_addr;
    let state = AppState {
        db: Arc::new(PostgresUserRepository {
            pool: pg_pool.clone(),
        }) as Arc<dyn UserRepository>,
        cart_repo: Arc::new(PostgresCartRepository {
            pool: pg_pool.clone(),
        }) as Arc<dyn CartRepository>,
        coupon_repo: Arc::new(PostgresCouponRepository {
            pool: pg_pool.clone(),
        }) as Arc<dyn CouponRepository>,
        product_repo: Arc::new(PostgresProductRepository { pool: pg_pool })
            as Arc<dyn ProductRepository>,
        issuer: Arc::new(issuer),
        config: Arc::new(config),
    };

    let auth = auth_routes(&state).layer(GovernorLayer {
        config: auth_governor_conf,
    });
    let app = api_router(state, auth);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "storefront backend listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Connects to the database and verifies the connection.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("connected to the database");
    Ok(pool)
}
