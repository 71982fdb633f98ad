use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One line of a user's cart. Stored lines always have `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
    pub product_id: Uuid,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartPayload {
    #[serde(default)]
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateQuantityPayload {
    pub quantity: i32,
}
