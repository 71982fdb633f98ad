use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use tracing::error;
use uuid::Uuid;

use crate::{
    models::cart::{AddToCartPayload, RemoveFromCartPayload, UpdateQuantityPayload},
    responses::JsonResponse,
    routes::auth::session::AuthSession,
    state::AppState,
};

fn cart_error(err: sqlx::Error, user_id: Uuid) -> Response {
    error!(?err, %user_id, "cart query failed");
    JsonResponse::server_error("Internal server error").into_response()
}

pub async fn get_cart(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
) -> Response {
    match state.cart_repo.list_cart_items(user.id).await {
        Ok(items) => JsonResponse::success(items).into_response(),
        Err(err) => cart_error(err, user.id),
    }
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Json(payload): Json<AddToCartPayload>,
) -> Response {
    match state
        .cart_repo
        .add_cart_item(user.id, payload.product_id)
        .await
    {
        Ok(items) => JsonResponse::success(items).into_response(),
        Err(err) => cart_error(err, user.id),
    }
}

/// Sets a line's quantity; zero drops the line.
pub async fn update_quantity(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityPayload>,
) -> Response {
    if payload.quantity < 0 {
        return JsonResponse::bad_request("Quantity must not be negative").into_response();
    }

    match state
        .cart_repo
        .set_cart_quantity(user.id, product_id, payload.quantity)
        .await
    {
        Ok(Some(items)) => JsonResponse::success(items).into_response(),
        Ok(None) => JsonResponse::not_found("Product not found in cart").into_response(),
        Err(err) => cart_error(err, user.id),
    }
}

/// Removes one line, or empties the cart when no product is named.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    body: Bytes,
) -> Response {
    let payload: RemoveFromCartPayload = if body.is_empty() {
        RemoveFromCartPayload::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(_) => return JsonResponse::bad_request("Invalid request body").into_response(),
        }
    };
    match state
        .cart_repo
        .remove_cart_items(user.id, payload.product_id)
        .await
    {
        Ok(items) => JsonResponse::success(items).into_response(),
        Err(err) => cart_error(err, user.id),
    }
}
