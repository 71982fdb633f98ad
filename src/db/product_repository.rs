use async_trait::async_trait;
use uuid::Uuid;

use crate::models::product::{NewProductPayload, Product};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, sqlx::Error>;
    async fn list_featured_products(&self) -> Result<Vec<Product>, sqlx::Error>;
    async fn list_products_by_category(&self, category: &str)
        -> Result<Vec<Product>, sqlx::Error>;
    /// Up to `limit` products in random order.
    async fn sample_products(&self, limit: i64) -> Result<Vec<Product>, sqlx::Error>;
    async fn create_product(&self, product: &NewProductPayload) -> Result<Product, sqlx::Error>;
    /// Returns `false` when no product has that id.
    async fn delete_product(&self, product_id: Uuid) -> Result<bool, sqlx::Error>;
    async fn toggle_featured(&self, product_id: Uuid) -> Result<Option<Product>, sqlx::Error>;
}
