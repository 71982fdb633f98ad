use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::{
    models::coupon::{ValidateCouponPayload, ValidatedCoupon},
    responses::JsonResponse,
    routes::auth::session::AuthSession,
    state::AppState,
};

pub async fn get_coupon(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
) -> Response {
    match state.coupon_repo.find_active_coupon(user.id).await {
        Ok(Some(coupon)) => JsonResponse::success(coupon).into_response(),
        Ok(None) => JsonResponse::not_found("No coupon found").into_response(),
        Err(err) => {
            error!(?err, user_id = %user.id, "failed to load coupon");
            JsonResponse::server_error("Internal server error").into_response()
        }
    }
}

/// Checks a code against the caller's active coupon. An expired coupon is
/// deactivated on first sight.
pub async fn validate_coupon(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Json(payload): Json<ValidateCouponPayload>,
) -> Response {
    let code = payload.code.trim();
    let coupon = match state
        .coupon_repo
        .find_active_coupon_by_code(user.id, code)
        .await
    {
        Ok(Some(coupon)) => coupon,
        Ok(None) => return JsonResponse::not_found("Coupon not found").into_response(),
        Err(err) => {
            error!(?err, user_id = %user.id, "failed to look up coupon");
            return JsonResponse::server_error("Internal server error").into_response();
        }
    };

    if coupon.is_expired_at(OffsetDateTime::now_utc()) {
        if let Err(err) = state.coupon_repo.deactivate_coupon(coupon.id).await {
            error!(?err, coupon_id = %coupon.id, "failed to deactivate expired coupon");
            return JsonResponse::server_error("Internal server error").into_response();
        }
        info!(coupon_id = %coupon.id, "deactivated expired coupon");
        return JsonResponse::bad_request("Coupon has expired").into_response();
    }

    JsonResponse::success(ValidatedCoupon {
        code: coupon.code,
        discount: coupon.discount_percentage,
    })
    .into_response()
}
