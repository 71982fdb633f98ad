pub mod cart_repository;
pub mod coupon_repository;
pub mod mock_db;
pub mod postgres_cart_repository;
pub mod postgres_coupon_repository;
pub mod postgres_product_repository;
pub mod postgres_user_repository;
pub mod product_repository;
pub mod user_repository;

/// True when the error is a unique-constraint violation reported by the database.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
