pub mod auth;
pub mod cart;
pub mod coupons;
pub mod payments;
pub mod products;

use axum::{
    http::{
        header::CONTENT_TYPE,
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::{config::Config, state::AppState};
use auth::{
    handle_login, handle_logout, handle_profile, handle_refresh, handle_signup,
    session::{require_admin, require_session},
};

/// `/api/auth/*`. Only the profile route needs a live session.
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let profile = Router::new()
        .route("/profile", get(handle_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/signup", post(handle_signup))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/refresh-token", post(handle_refresh))
        .merge(profile)
}

/// Cart, coupon and checkout routes, all behind the session layer.
pub fn storefront_routes(state: &AppState) -> Router<AppState> {
    let cart = Router::new()
        .route(
            "/",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .delete(cart::remove_from_cart),
        )
        .route("/{product_id}", put(cart::update_quantity));

    let coupons = Router::new()
        .route("/", get(coupons::get_coupon))
        .route("/validate", post(coupons::validate_coupon));

    let payments = Router::new().route("/checkout-summary", post(payments::checkout_summary));

    Router::new()
        .nest("/cart", cart)
        .nest("/coupons", coupons)
        .nest("/payments", payments)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
}

/// `/api/products/*`. Catalog reads are public; everything else is admin-only.
pub fn product_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route(
            "/",
            get(products::get_all_products).post(products::create_product),
        )
        .route(
            "/{product_id}",
            delete(products::delete_product).patch(products::toggle_featured_product),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/featured", get(products::get_featured_products))
        .route("/category/{category}", get(products::get_products_by_category))
        .route("/recommendations", get(products::get_recommended_products))
        .merge(admin)
}

/// Assembles the `/api` tree around a caller-supplied auth router, so the
/// binary can wrap it in a rate limiter.
pub fn api_router(state: AppState, auth: Router<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let storefront = storefront_routes(&state);
    let products = product_routes(&state);

    Router::new()
        .nest("/api/auth", auth)
        .nest("/api/products", products)
        .nest("/api", storefront)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// The full API without rate limiting.
pub fn app_router(state: AppState) -> Router {
    let auth = auth_routes(&state);
    api_router(state, auth)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    match config.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(origin = %config.frontend_origin, "FRONTEND_ORIGIN is not a valid header value; CORS disabled");
            cors
        }
    }
}
