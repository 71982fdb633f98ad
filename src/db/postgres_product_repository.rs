use crate::{
    db::product_repository::ProductRepository,
    models::product::{NewProductPayload, Product},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresProductRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, image, category, is_featured, created_at
            FROM products
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_featured_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, image, category, is_featured, created_at
            FROM products
            WHERE is_featured
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, image, category, is_featured, created_at
            FROM products
            WHERE category = $1
            ORDER BY created_at
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
    }

    async fn sample_products(&self, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, image, category, is_featured, created_at
            FROM products
            ORDER BY random()
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_product(&self, product: &NewProductPayload) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price_cents, image, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price_cents, image, category, is_featured, created_at
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(&product.category)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_featured(&self, product_id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET is_featured = NOT is_featured
            WHERE id = $1
            RETURNING id, name, description, price_cents, image, category, is_featured, created_at
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
    }
}
