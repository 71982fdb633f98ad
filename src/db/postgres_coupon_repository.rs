use crate::{
    db::coupon_repository::CouponRepository,
    models::coupon::{Coupon, NewCoupon},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresCouponRepository {
    pub pool: PgPool,
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            SELECT id, user_id, code, discount_percentage, expires_at, is_active
            FROM coupons
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            SELECT id, user_id, code, discount_percentage, expires_at, is_active
            FROM coupons
            WHERE user_id = $1 AND code = $2 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE coupons SET is_active = false WHERE id = $1")
            .bind(coupon_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_user_coupon(
        &self,
        user_id: Uuid,
        coupon: NewCoupon,
    ) -> Result<Coupon, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM coupons WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let stored = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (user_id, code, discount_percentage, expires_at, is_active)
            VALUES ($1, $2, $3, $4, true)
            RETURNING id, user_id, code, discount_percentage, expires_at, is_active
            "#,
        )
        .bind(user_id)
        .bind(&coupon.code)
        .bind(coupon.discount_percentage)
        .bind(coupon.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }
}
