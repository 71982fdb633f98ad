use serde::{Deserialize, Serialize};

use crate::models::coupon::Coupon;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutProduct {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummaryPayload {
    #[serde(default)]
    pub products: Vec<CheckoutProduct>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub total_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_coupon: Option<Coupon>,
}

/// Sum of `price × quantity` over every line, or `None` on a negative price,
/// a non-positive quantity, or overflow.
pub fn order_total(products: &[CheckoutProduct]) -> Option<i64> {
    products.iter().try_fold(0i64, |total, product| {
        if product.price_cents < 0 || product.quantity < 1 {
            return None;
        }
        total.checked_add(product.price_cents.checked_mul(product.quantity)?)
    })
}

/// Applies a percentage discount, rounding the discount to the nearest cent.
/// `None` when the total is too large to scale.
pub fn apply_discount(total_cents: i64, percentage: i32) -> Option<i64> {
    let percentage = i64::from(percentage.clamp(0, 100));
    let discount = total_cents.checked_mul(percentage)?.checked_add(50)? / 100;
    total_cents.checked_sub(discount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price_cents: i64, quantity: i64) -> CheckoutProduct {
        CheckoutProduct {
            id: "p".into(),
            name: "Product".into(),
            price_cents,
            quantity,
        }
    }

    #[test]
    fn totals_lines() {
        assert_eq!(order_total(&[product(1999, 2), product(500, 1)]), Some(4498));
        assert_eq!(order_total(&[]), Some(0));
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(order_total(&[product(-1, 1)]), None);
        assert_eq!(order_total(&[product(100, 0)]), None);
        assert_eq!(order_total(&[product(i64::MAX, 2)]), None);
    }

    #[test]
    fn discount_rounds_to_nearest_cent() {
        assert_eq!(apply_discount(10_000, 10), Some(9_000));
        assert_eq!(apply_discount(1_005, 10), Some(904));
        assert_eq!(apply_discount(1_000, 0), Some(1_000));
    }

    #[test]
    fn huge_totals_are_not_discounted() {
        let total = order_total(&[product(1_000_000_000_000_000_000, 1)]);
        assert_eq!(total, Some(1_000_000_000_000_000_000));
        assert_eq!(apply_discount(total.unwrap(), 10), None);
        assert_eq!(apply_discount(i64::MAX, 0), Some(i64::MAX));
    }
}
