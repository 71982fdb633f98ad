use crate::{db::cart_repository::CartRepository, models::cart::CartItem};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct PostgresCartRepository {
    pub pool: PgPool,
}

impl PostgresCartRepository {
    async fn list_in(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at, product_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn list_cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let items = Self::list_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(items)
    }

    async fn add_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + 1
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        let items = Self::list_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(items)
    }

    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartItem>>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = if quantity == 0 {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?
        } else {
            sqlx::query(
                "UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?
        };

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let items = Self::list_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(Some(items))
    }

    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        match product_id {
            Some(product_id) => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                    .bind(user_id)
                    .bind(product_id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let items = Self::list_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(items)
    }
}
