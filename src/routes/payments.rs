use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::{
    models::{
        checkout::{apply_discount, order_total, CheckoutSummary, CheckoutSummaryPayload},
        coupon::{NewCoupon, GIFT_COUPON_THRESHOLD_CENTS},
    },
    responses::JsonResponse,
    routes::auth::session::AuthSession,
    state::AppState,
};

/// Prices an order, applying the caller's coupon when the code matches an
/// active, unexpired one. Orders above the gift threshold replace the
/// caller's coupon with a fresh gift coupon.
pub async fn checkout_summary(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Json(payload): Json<CheckoutSummaryPayload>,
) -> Response {
    if payload.products.is_empty() {
        return JsonResponse::bad_request("Invalid or empty products array").into_response();
    }
    let Some(mut total_cents) = order_total(&payload.products) else {
        return JsonResponse::bad_request("Invalid product line").into_response();
    };

    let now = OffsetDateTime::now_utc();
    let mut discount_percentage = None;
    if let Some(code) = payload
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        match state
            .coupon_repo
            .find_active_coupon_by_code(user.id, code)
            .await
        {
            Ok(Some(coupon)) if !coupon.is_expired_at(now) => {
                let Some(discounted) = apply_discount(total_cents, coupon.discount_percentage)
                else {
                    return JsonResponse::bad_request("Invalid product line").into_response();
                };
                total_cents = discounted;
                discount_percentage = Some(coupon.discount_percentage);
            }
            Ok(_) => {}
            Err(err) => {
                error!(?err, user_id = %user.id, "failed to look up checkout coupon");
                return JsonResponse::server_error("Internal server error").into_response();
            }
        }
    }

    let mut gift_coupon = None;
    if total_cents > GIFT_COUPON_THRESHOLD_CENTS {
        match state
            .coupon_repo
            .replace_user_coupon(user.id, NewCoupon::gift(now))
            .await
        {
            Ok(coupon) => {
                info!(user_id = %user.id, coupon_id = %coupon.id, "issued gift coupon");
                gift_coupon = Some(coupon);
            }
            Err(err) => {
                error!(?err, user_id = %user.id, "failed to issue gift coupon");
                return JsonResponse::server_error("Internal server error").into_response();
            }
        }
    }

    JsonResponse::success(CheckoutSummary {
        total_cents,
        discount_percentage,
        gift_coupon,
    })
    .into_response()
}
