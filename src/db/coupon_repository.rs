use async_trait::async_trait;
use uuid::Uuid;

use crate::models::coupon::{Coupon, NewCoupon};

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error>;
    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error>;
    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error>;
    /// Deletes every coupon the user holds and stores `coupon` as the only one.
    async fn replace_user_coupon(
        &self,
        user_id: Uuid,
        coupon: NewCoupon,
    ) -> Result<Coupon, sqlx::Error>;
}
