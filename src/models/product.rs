use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// How many products the recommendations endpoint samples.
pub const RECOMMENDATION_SAMPLE_SIZE: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    /// Already-hosted image URL, or empty.
    pub image: String,
    pub category: String,
    pub is_featured: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductPayload {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub image: String,
    pub category: String,
}

impl NewProductPayload {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.image = self.image.trim().to_string();
        self.category = self.category.trim().to_lowercase();
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("Name is required");
        }
        if self.description.is_empty() {
            return Err("Description is required");
        }
        if self.price_cents < 0 {
            return Err("Price must not be negative");
        }
        if self.category.is_empty() {
            return Err("Category is required");
        }
        Ok(())
    }
}
