use std::sync::Arc;

use reqwest::{cookie::Jar, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::{
    client::{
        cart_store::{CartAction, CartStore, ProductSummary},
        coordinator::RefreshCoordinator,
        error::ClientError,
        product_store::{ProductAction, ProductStore},
        store::{UserAction, UserStore},
        transport::HttpTransport,
    },
    models::{
        cart::CartItem,
        checkout::{CheckoutProduct, CheckoutSummary},
        coupon::ValidatedCoupon,
        product::{NewProductPayload, Product},
        user::PublicUser,
    },
};

#[derive(Deserialize)]
struct UserEnvelope {
    user: PublicUser,
}

/// The storefront API as seen from a browser-like client: cookies live in
/// the jar and session state in the stores.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<HttpTransport>,
    coordinator: RefreshCoordinator,
    users: UserStore,
    cart: CartStore,
    products: ProductStore,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_jar(base_url, Arc::new(Jar::default()))
    }

    /// Builds a client over an existing cookie jar.
    pub fn with_jar(base_url: &str, jar: Arc<Jar>) -> Result<Self, ClientError> {
        let users = UserStore::default();
        let transport = Arc::new(HttpTransport::new(base_url, jar, users.clone())?);
        Ok(Self {
            coordinator: RefreshCoordinator::new(transport.clone()),
            transport,
            users,
            cart: CartStore::default(),
            products: ProductStore::default(),
        })
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn products(&self) -> &ProductStore {
        &self.products
    }

    pub fn jar(&self) -> &Arc<Jar> {
        self.transport.jar()
    }

    pub fn base_url(&self) -> &reqwest::Url {
        self.transport.base_url()
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<PublicUser, ClientError> {
        if password != confirm_password {
            return Err(ClientError::Validation("Passwords do not match".into()));
        }

        let body = json!({"name": name, "email": email, "password": password});
        self.sign_in("auth/signup", &body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let body = json!({"email": email, "password": password});
        self.sign_in("auth/login", &body).await
    }

    /// Clears local identity even if the server cannot be reached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.transport.url("auth/logout")?;
        let outcome = self.transport.client().post(url).send().await;
        self.users.dispatch(UserAction::LoggedOut);

        let _: String = HttpTransport::decode(outcome?).await?;
        Ok(())
    }

    /// Resolves the current session, refreshing once if the access cookie
    /// has expired. Any failure leaves the client signed out.
    pub async fn check_auth(&self) -> Option<PublicUser> {
        self.users.dispatch(UserAction::CheckingAuth);
        let result: Result<PublicUser, ClientError> = self
            .protected(|client, url| client.get(url), "auth/profile")
            .await;
        let user = match result {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(%err, "no active session");
                None
            }
        };
        self.users.dispatch(UserAction::AuthChecked(user.clone()));
        user
    }

    pub async fn get_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let items: Vec<CartItem> = self.protected(|client, url| client.get(url), "cart").await?;
        self.cart.dispatch(CartAction::Reconciled(items.clone()));
        Ok(items)
    }

    pub async fn add_to_cart(&self, product: ProductSummary) -> Result<Vec<CartItem>, ClientError> {
        let body = json!({"productId": product.id});
        let items = self
            .protected(|client, url| client.post(url).json(&body), "cart")
            .await?;
        self.cart.dispatch(CartAction::Added(product));
        Ok(items)
    }

    pub async fn update_quantity(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<CartItem>, ClientError> {
        let body = json!({"quantity": quantity});
        let items = self
            .protected(
                |client, url| client.put(url).json(&body),
                &format!("cart/{product_id}"),
            )
            .await?;
        self.cart.dispatch(CartAction::QuantitySet {
            product_id,
            quantity,
        });
        Ok(items)
    }

    /// Removes one product, or the whole cart when `product_id` is `None`.
    pub async fn remove_from_cart(
        &self,
        product_id: Option<Uuid>,
    ) -> Result<Vec<CartItem>, ClientError> {
        let body = json!({"productId": product_id});
        let items = self
            .protected(|client, url| client.delete(url).json(&body), "cart")
            .await?;
        self.cart.dispatch(match product_id {
            Some(product_id) => CartAction::Removed(product_id),
            None => CartAction::Cleared,
        });
        Ok(items)
    }

    pub async fn validate_coupon(&self, code: &str) -> Result<ValidatedCoupon, ClientError> {
        let body = json!({"code": code});
        let coupon: ValidatedCoupon = self
            .protected(|client, url| client.post(url).json(&body), "coupons/validate")
            .await?;
        self.cart.dispatch(CartAction::CouponApplied(coupon.clone()));
        Ok(coupon)
    }

    pub fn remove_coupon(&self) {
        self.cart.dispatch(CartAction::CouponRemoved);
    }

    /// Prices the local cart on the server, with the applied coupon if any.
    pub async fn checkout_summary(&self) -> Result<CheckoutSummary, ClientError> {
        let state = self.cart.snapshot();
        let products: Vec<CheckoutProduct> = state
            .lines
            .iter()
            .map(|line| CheckoutProduct {
                id: line.product.id.to_string(),
                name: line.product.name.clone(),
                price_cents: line.product.price_cents,
                quantity: line.quantity,
            })
            .collect();
        let body = json!({
            "products": products,
            "couponCode": state.coupon.map(|coupon| coupon.code),
        });

        self.protected(
            |client, url| client.post(url).json(&body),
            "payments/checkout-summary",
        )
        .await
    }

    pub async fn fetch_featured_products(&self) -> Result<Vec<Product>, ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<Vec<Product>, ClientError> = self.public_get("products/featured").await;
        self.settle_products(result)
    }

    pub async fn fetch_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<Vec<Product>, ClientError> = self
            .public_get(&format!("products/category/{category}"))
            .await;
        self.settle_products(result)
    }

    pub async fn fetch_recommended_products(&self) -> Result<Vec<Product>, ClientError> {
        self.public_get("products/recommendations").await
    }

    /// Admin only.
    pub async fn fetch_all_products(&self) -> Result<Vec<Product>, ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<Vec<Product>, ClientError> = self
            .protected(|client, url| client.get(url), "products")
            .await;
        self.settle_products(result)
    }

    /// Admin only.
    pub async fn create_product(&self, product: &NewProductPayload) -> Result<Product, ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<Product, ClientError> = self
            .protected(|client, url| client.post(url).json(product), "products")
            .await;
        self.products.dispatch(match &result {
            Ok(created) => ProductAction::Created(created.clone()),
            Err(_) => ProductAction::Failed,
        });
        result
    }

    /// Admin only.
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<String, ClientError> = self
            .protected(
                |client, url| client.delete(url),
                &format!("products/{product_id}"),
            )
            .await;
        self.products.dispatch(match &result {
            Ok(_) => ProductAction::Deleted(product_id),
            Err(_) => ProductAction::Failed,
        });
        result.map(|_| ())
    }

    /// Admin only.
    pub async fn toggle_featured_product(&self, product_id: Uuid) -> Result<Product, ClientError> {
        self.products.dispatch(ProductAction::Loading);
        let result: Result<Product, ClientError> = self
            .protected(
                |client, url| client.patch(url),
                &format!("products/{product_id}"),
            )
            .await;
        self.products.dispatch(match &result {
            Ok(updated) => ProductAction::Updated(updated.clone()),
            Err(_) => ProductAction::Failed,
        });
        result
    }

    fn settle_products(
        &self,
        result: Result<Vec<Product>, ClientError>,
    ) -> Result<Vec<Product>, ClientError> {
        self.products.dispatch(match &result {
            Ok(products) => ProductAction::Loaded(products.clone()),
            Err(_) => ProductAction::Failed,
        });
        result
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.transport.url(path)?;
        let response = self.transport.client().get(url).send().await?;
        HttpTransport::decode(response).await
    }

    async fn sign_in(&self, path: &str, body: &serde_json::Value) -> Result<PublicUser, ClientError> {
        self.users.dispatch(UserAction::Started);

        let result = async {
            let url = self.transport.url(path)?;
            let response = self.transport.client().post(url).json(body).send().await?;
            HttpTransport::decode::<UserEnvelope>(response).await
        }
        .await;

        match result {
            Ok(envelope) => {
                self.users.dispatch(UserAction::SignedIn(envelope.user.clone()));
                Ok(envelope.user)
            }
            Err(err) => {
                self.users.dispatch(UserAction::Failed);
                Err(err)
            }
        }
    }

    /// Sends a request that needs a session. A 401 triggers (or joins) a
    /// refresh and the request is replayed once; a second 401 is returned
    /// as-is.
    async fn protected<T: DeserializeOwned>(
        &self,
        build: impl Fn(&reqwest::Client, reqwest::Url) -> RequestBuilder,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.transport.url(path)?;
        let epoch = self.coordinator.epoch().await;

        let response = build(self.transport.client(), url.clone()).send().await?;
        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return HttpTransport::decode(response).await;
        }

        debug!(%url, "access rejected; refreshing session");
        self.coordinator
            .refresh(epoch)
            .await
            .map_err(ClientError::RefreshFailed)?;

        let response = build(self.transport.client(), url).send().await?;
        HttpTransport::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signup_checks_confirmation_locally() {
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();

        let err = client
            .signup("Ada", "ada@example.com", "secret123", "secret124")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(msg) if msg == "Passwords do not match"));
        assert!(!client.users().snapshot().loading);
    }

    #[test]
    fn remove_coupon_is_local() {
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        client.cart().dispatch(CartAction::CouponApplied(ValidatedCoupon {
            code: "GIFTAAAAAA".into(),
            discount: 10,
        }));

        client.remove_coupon();
        assert!(client.cart().snapshot().coupon.is_none());
    }

    #[tokio::test]
    async fn failed_catalog_load_clears_loading() {
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();

        let err = client.fetch_featured_products().await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        let state = client.products().snapshot();
        assert!(!state.loading);
        assert!(state.products.is_empty());
    }
}
