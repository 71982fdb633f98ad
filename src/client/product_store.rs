use uuid::Uuid;

use crate::{
    client::{
        cart_store::ProductSummary,
        store::{Reducer, Store},
    },
    models::product::Product,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductState {
    pub products: Vec<Product>,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub enum ProductAction {
    Loading,
    Loaded(Vec<Product>),
    Failed,
    Created(Product),
    Deleted(Uuid),
    /// Replaces the product with the same id, if listed.
    Updated(Product),
}

impl Reducer for ProductState {
    type Action = ProductAction;

    fn reduce(&self, action: ProductAction) -> Self {
        let mut next = self.clone();
        next.loading = false;
        match action {
            ProductAction::Loading => next.loading = true,
            ProductAction::Loaded(products) => next.products = products,
            ProductAction::Failed => {}
            ProductAction::Created(product) => next.products.push(product),
            ProductAction::Deleted(product_id) => {
                next.products.retain(|product| product.id != product_id)
            }
            ProductAction::Updated(updated) => {
                if let Some(product) = next
                    .products
                    .iter_mut()
                    .find(|product| product.id == updated.id)
                {
                    *product = updated;
                }
            }
        }
        next
    }
}

pub type ProductStore = Store<ProductState>;

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price_cents: product.price_cents,
        }
    }
}
