use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const GIFT_COUPON_PREFIX: &str = "GIFT";
pub const GIFT_COUPON_DISCOUNT: i32 = 10;
pub const GIFT_COUPON_VALID_DAYS: i64 = 10;
/// Checkout totals above this amount (in cents) earn a gift coupon.
pub const GIFT_COUPON_THRESHOLD_CENTS: i64 = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub discount_percentage: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub is_active: bool,
}

impl Coupon {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percentage: i32,
    pub expires_at: OffsetDateTime,
}

impl NewCoupon {
    pub fn gift(now: OffsetDateTime) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();

        Self {
            code: format!("{}{}", GIFT_COUPON_PREFIX, suffix),
            discount_percentage: GIFT_COUPON_DISCOUNT,
            expires_at: now + Duration::days(GIFT_COUPON_VALID_DAYS),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidateCouponPayload {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidatedCoupon {
    pub code: String,
    pub discount: i32,
}
