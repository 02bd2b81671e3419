//! Cart totals and order summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{AppliedCoupon, LineItem, VariantKey};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;

/// Totals derived from a cart state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of line quantities.
    pub total_quantity: i64,
    /// Sum of unit price times quantity.
    pub subtotal: Money,
    /// Discount stored with the applied coupon, or zero.
    pub discount_amount: Money,
    /// Subtotal minus discount. May be negative.
    pub final_price: Money,
}

impl CartTotals {
    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount_amount.amount_cents > 0
    }

    /// Get discount percentage of subtotal.
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal.amount_cents == 0 {
            return 0.0;
        }
        (self.discount_amount.amount_cents as f64 / self.subtotal.amount_cents as f64) * 100.0
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub key: VariantKey,
    pub product_id: ProductId,
    pub name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

impl OrderLine {
    pub(crate) fn from_item(item: &LineItem) -> Result<Self, CommerceError> {
        Ok(Self {
            key: item.key.clone(),
            product_id: item.product_id.clone(),
            name: item.product.name.clone(),
            color: item.color.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
            unit_price: item.variant_price,
            total: item.line_total()?,
        })
    }
}

/// What checkout hands back once the cart has been emptied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCoupon>,
    pub totals: CartTotals,
    pub placed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(subtotal: i64, discount: i64) -> CartTotals {
        CartTotals {
            line_count: 1,
            total_quantity: 1,
            subtotal: Money::usd(subtotal),
            discount_amount: Money::usd(discount),
            final_price: Money::usd(subtotal - discount),
        }
    }

    #[test]
    fn test_discount_percentage() {
        assert!(!totals(100, 0).has_discount());
        assert!(totals(100, 15).has_discount());
        assert!((totals(200, 50).discount_percentage() - 25.0).abs() < f64::EPSILON);
        assert_eq!(totals(0, 6).discount_percentage(), 0.0);
    }

    #[test]
    fn test_totals_json_is_camel_case() {
        let json = serde_json::to_value(totals(60, 6)).unwrap();
        assert_eq!(json["finalPrice"]["amount_cents"], 5400);
        assert_eq!(json["totalQuantity"], 1);
    }
}
