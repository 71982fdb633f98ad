use async_trait::async_trait;
use uuid::Uuid;

use crate::models::cart::CartItem;

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list_cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, sqlx::Error>;

    /// Adds one unit of the product, creating the line if needed. Returns the cart.
    async fn add_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<CartItem>, sqlx::Error>;

    /// Sets the quantity of an existing line; zero removes it. Returns `None`
    /// when the product is not in the cart.
    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartItem>>, sqlx::Error>;

    /// Removes one line, or every line when `product_id` is `None`. Returns the cart.
    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<CartItem>, sqlx::Error>;
}
