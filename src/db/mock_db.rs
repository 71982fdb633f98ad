use crate::db::{
    cart_repository::CartRepository, coupon_repository::CouponRepository,
    product_repository::ProductRepository, user_repository::UserRepository,
};
use crate::models::{
    cart::CartItem,
    coupon::{Coupon, NewCoupon},
    product::{NewProductPayload, Product},
    user::{PublicUser, User, UserRole},
};
use crate::utils::password::HashedPassword;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use sqlx::error::{DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory stand-in for every repository. Used by handler tests and the
/// integration tests under `tests/`.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<Vec<User>>,
    pub carts: Mutex<HashMap<Uuid, Vec<CartItem>>>,
    pub coupons: Mutex<Vec<Coupon>>,
    pub products: Mutex<Vec<Product>>,
    pub should_fail: bool,
    /// `is_email_taken` always answers `false`, as when a concurrent signup
    /// for the same email commits between the check and the insert.
    pub stale_email_check: bool,
    pub create_user_calls: Mutex<usize>,
}

/// The error Postgres reports when an insert hits a unique index.
#[derive(Debug)]
pub struct UniqueViolation {
    constraint: &'static str,
}

impl UniqueViolation {
    pub fn new(constraint: &'static str) -> Self {
        Self { constraint }
    }
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate key value violates unique constraint \"{}\"",
            self.constraint
        )
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

impl MockDb {
    pub fn with_user(user: User) -> Self {
        Self {
            users: Mutex::new(vec![user]),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn remove_user(&self, user_id: Uuid) {
        self.users.lock().unwrap().retain(|user| user.id != user_id);
    }

    pub fn insert_coupon(&self, coupon: Coupon) {
        self.coupons.lock().unwrap().push(coupon);
    }

    pub fn coupons_for(&self, user_id: Uuid) -> Vec<Coupon> {
        self.coupons
            .lock()
            .unwrap()
            .iter()
            .filter(|coupon| coupon.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn insert_product(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn product(&self, product_id: Uuid) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.id == product_id)
            .cloned()
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == user_id)
            .map(PublicUser::from))
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let taken = self.find_user_by_email(email).await?.is_some();
        Ok(taken && !self.stale_email_check)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &HashedPassword,
    ) -> Result<User, sqlx::Error> {
        self.check()?;
        *self.create_user_calls.lock().unwrap() += 1;

        let mut users = self.users.lock().unwrap();
        if users.iter().any(|user| user.email.eq_ignore_ascii_case(email)) {
            return Err(sqlx::Error::Database(Box::new(UniqueViolation::new(
                "users_email_key",
            ))));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.as_str().to_string(),
            role: UserRole::Customer,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CartRepository for MockDb {
    async fn list_cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, sqlx::Error> {
        self.check()?;
        Ok(self
            .carts
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        self.check()?;
        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(user_id).or_default();
        match cart.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => item.quantity += 1,
            None => cart.push(CartItem {
                product_id,
                quantity: 1,
            }),
        }
        Ok(cart.clone())
    }

    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartItem>>, sqlx::Error> {
        self.check()?;
        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(user_id).or_default();
        let Some(position) = cart.iter().position(|item| item.product_id == product_id) else {
            return Ok(None);
        };
        if quantity == 0 {
            cart.remove(position);
        } else if let Some(item) = cart.get_mut(position) {
            item.quantity = quantity;
        }
        Ok(Some(cart.clone()))
    }

    async fn remove_cart_items(
        &self,
        user_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        self.check()?;
        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(user_id).or_default();
        match product_id {
            Some(product_id) => cart.retain(|item| item.product_id != product_id),
            None => cart.clear(),
        }
        Ok(cart.clone())
    }
}

#[async_trait]
impl CouponRepository for MockDb {
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error> {
        self.check()?;
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|coupon| coupon.user_id == user_id && coupon.is_active)
            .cloned())
    }

    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        self.check()?;
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|coupon| coupon.user_id == user_id && coupon.is_active && coupon.code == code)
            .cloned())
    }

    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error> {
        self.check()?;
        if let Some(coupon) = self
            .coupons
            .lock()
            .unwrap()
            .iter_mut()
            .find(|coupon| coupon.id == coupon_id)
        {
            coupon.is_active = false;
        }
        Ok(())
    }

    async fn replace_user_coupon(
        &self,
        user_id: Uuid,
        coupon: NewCoupon,
    ) -> Result<Coupon, sqlx::Error> {
        self.check()?;
        let mut coupons = self.coupons.lock().unwrap();
        coupons.retain(|existing| existing.user_id != user_id);
        let stored = Coupon {
            id: Uuid::new_v4(),
            user_id,
            code: coupon.code,
            discount_percentage: coupon.discount_percentage,
            expires_at: coupon.expires_at,
            is_active: true,
        };
        coupons.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ProductRepository for MockDb {
    async fn list_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn list_featured_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.is_featured)
            .cloned()
            .collect())
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.category == category)
            .cloned()
            .collect())
    }

    async fn sample_products(&self, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        let mut products = self.products.lock().unwrap().clone();
        products.shuffle(&mut rand::rng());
        products.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(products)
    }

    async fn create_product(&self, product: &NewProductPayload) -> Result<Product, sqlx::Error> {
        self.check()?;
        let stored = Product {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            description: product.description.clone(),
            price_cents: product.price_cents,
            image: product.image.clone(),
            category: product.category.clone(),
            is_featured: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.products.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|product| product.id != product_id);
        Ok(products.len() < before)
    }

    async fn toggle_featured(&self, product_id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        self.check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter_mut()
            .find(|product| product.id == product_id)
            .map(|product| {
                product.is_featured = !product.is_featured;
                product.clone()
            }))
    }
}
