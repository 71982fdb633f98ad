use crate::config::Config;
use crate::db::{
    cart_repository::CartRepository, coupon_repository::CouponRepository,
    product_repository::ProductRepository, user_repository::UserRepository,
};
use crate::routes::auth::issuer::CredentialIssuer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub cart_repo: Arc<dyn CartRepository>,
    pub coupon_repo: Arc<dyn CouponRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub issuer: Arc<CredentialIssuer>,
    pub config: Arc<Config>,
}
