use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    models::product::{NewProductPayload, RECOMMENDATION_SAMPLE_SIZE},
    responses::JsonResponse,
    routes::auth::session::AuthSession,
    state::AppState,
};

fn catalog_error(err: sqlx::Error, action: &'static str) -> Response {
    error!(?err, action, "product catalog query failed");
    JsonResponse::server_error("Internal server error").into_response()
}

pub async fn get_featured_products(State(state): State<AppState>) -> Response {
    match state.product_repo.list_featured_products().await {
        Ok(products) => JsonResponse::success(products).into_response(),
        Err(err) => catalog_error(err, "list featured"),
    }
}

pub async fn get_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    let category = category.trim().to_lowercase();
    match state.product_repo.list_products_by_category(&category).await {
        Ok(products) => JsonResponse::success(products).into_response(),
        Err(err) => catalog_error(err, "list by category"),
    }
}

pub async fn get_recommended_products(State(state): State<AppState>) -> Response {
    match state
        .product_repo
        .sample_products(RECOMMENDATION_SAMPLE_SIZE)
        .await
    {
        Ok(products) => JsonResponse::success(products).into_response(),
        Err(err) => catalog_error(err, "sample"),
    }
}

pub async fn get_all_products(State(state): State<AppState>) -> Response {
    match state.product_repo.list_products().await {
        Ok(products) => JsonResponse::success(products).into_response(),
        Err(err) => catalog_error(err, "list all"),
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthSession(admin): AuthSession,
    Json(mut payload): Json<NewProductPayload>,
) -> Response {
    payload.normalize();
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    match state.product_repo.create_product(&payload).await {
        Ok(product) => {
            info!(admin_id = %admin.id, product_id = %product.id, "product created");
            JsonResponse::created(product).into_response()
        }
        Err(err) => catalog_error(err, "create"),
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthSession(admin): AuthSession,
    Path(product_id): Path<Uuid>,
) -> Response {
    match state.product_repo.delete_product(product_id).await {
        Ok(true) => {
            info!(admin_id = %admin.id, %product_id, "product deleted");
            JsonResponse::success("Product deleted successfully").into_response()
        }
        Ok(false) => JsonResponse::not_found("Product not found").into_response(),
        Err(err) => catalog_error(err, "delete"),
    }
}

pub async fn toggle_featured_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Response {
    match state.product_repo.toggle_featured(product_id).await {
        Ok(Some(product)) => JsonResponse::success(product).into_response(),
        Ok(None) => JsonResponse::not_found("Product not found").into_response(),
        Err(err) => catalog_error(err, "toggle featured"),
    }
}
