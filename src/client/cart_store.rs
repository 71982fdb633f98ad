use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    client::store::{Reducer, Store},
    models::{cart::CartItem, checkout::apply_discount, coupon::ValidatedCoupon},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: ProductSummary,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub coupon: Option<ValidatedCoupon>,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone)]
pub enum CartAction {
    Added(ProductSummary),
    QuantitySet { product_id: Uuid, quantity: i32 },
    Removed(Uuid),
    Cleared,
    CouponApplied(ValidatedCoupon),
    CouponRemoved,
    /// Server-side quantities win. Local lines the server no longer has are
    /// dropped; server lines for products unknown locally are skipped.
    Reconciled(Vec<CartItem>),
}

impl CartState {
    /// Totals saturate at `i64::MAX`; a saturated subtotal is shown undiscounted.
    fn with_totals(mut self) -> Self {
        self.subtotal_cents = self.lines.iter().fold(0i64, |total, line| {
            total.saturating_add(line.product.price_cents.saturating_mul(line.quantity))
        });
        self.total_cents = match &self.coupon {
            Some(coupon) => apply_discount(self.subtotal_cents, coupon.discount)
                .unwrap_or(self.subtotal_cents),
            None => self.subtotal_cents,
        };
        self
    }
}

impl Reducer for CartState {
    type Action = CartAction;

    fn reduce(&self, action: CartAction) -> Self {
        let mut next = self.clone();
        match action {
            CartAction::Added(product) => {
                match next.lines.iter_mut().find(|line| line.product.id == product.id) {
                    Some(line) => line.quantity += 1,
                    None => next.lines.push(CartLine {
                        product,
                        quantity: 1,
                    }),
                }
            }
            CartAction::QuantitySet {
                product_id,
                quantity,
            } => {
                if quantity <= 0 {
                    next.lines.retain(|line| line.product.id != product_id);
                } else if let Some(line) = next
                    .lines
                    .iter_mut()
                    .find(|line| line.product.id == product_id)
                {
                    line.quantity = i64::from(quantity);
                }
            }
            CartAction::Removed(product_id) => {
                next.lines.retain(|line| line.product.id != product_id)
            }
            CartAction::Cleared => {
                next.lines.clear();
                next.coupon = None;
            }
            CartAction::CouponApplied(coupon) => next.coupon = Some(coupon),
            CartAction::CouponRemoved => next.coupon = None,
            CartAction::Reconciled(items) => {
                next.lines = items
                    .into_iter()
                    .filter_map(|item| {
                        let line = self
                            .lines
                            .iter()
                            .find(|line| line.product.id == item.product_id)?;
                        Some(CartLine {
                            product: line.product.clone(),
                            quantity: i64::from(item.quantity),
                        })
                    })
                    .collect();
            }
        }
        next.with_totals()
    }
}

pub type CartStore = Store<CartState>;
