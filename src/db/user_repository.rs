use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::user::{PublicUser, User},
    utils::password::HashedPassword,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    /// Inserts a customer. Fails with a unique violation if the email is taken.
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &HashedPassword,
    ) -> Result<User, sqlx::Error>;
}
