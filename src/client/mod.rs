//! Client for the storefront API.
//!
//! State lives in explicit [`store::Store`] handles; protected calls recover
//! from an expired access cookie through the shared
//! [`coordinator::RefreshCoordinator`].

pub mod api;
pub mod cart_store;
pub mod coordinator;
pub mod error;
pub mod product_store;
pub mod store;
pub mod transport;

pub use api::ApiClient;
pub use error::ClientError;
