//! Variant-aware price and stock lookups.
//!
//! A selection is a color and/or size chosen on the product page. The
//! lookup order is fixed: exact color+size match, then the first variant
//! with the selected color, then the first with the selected size, then
//! the product's base values. An empty string counts as "not selected".

use crate::catalog::{Product, ProductVariant};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// The lowest and highest price a product can be bought at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    /// Whether all variants cost the same.
    pub fn is_single(&self) -> bool {
        self.min == self.max
    }
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Product {
    /// Find the variant that governs a color/size selection.
    ///
    /// Returns `None` when the product has no variant table, nothing is
    /// selected, or no variant matches either attribute.
    pub fn matching_variant(
        &self,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Option<&ProductVariant> {
        let color = selected(color);
        let size = selected(size);

        if self.variants.is_empty() || (color.is_none() && size.is_none()) {
            return None;
        }

        if let (Some(c), Some(s)) = (color, size) {
            if let Some(exact) = self.variants.iter().find(|v| v.color == c && v.size == s) {
                return Some(exact);
            }
        }

        if let Some(c) = color {
            if let Some(by_color) = self.variants.iter().find(|v| v.color == c) {
                return Some(by_color);
            }
        }

        if let Some(s) = size {
            if let Some(by_size) = self.variants.iter().find(|v| v.size == s) {
                return Some(by_size);
            }
        }

        None
    }

    /// Unit price for a selection, falling back to the base price.
    pub fn variant_price(&self, color: Option<&str>, size: Option<&str>) -> Money {
        self.matching_variant(color, size)
            .map(|v| v.price)
            .unwrap_or(self.price)
    }

    /// Original price for a selection.
    ///
    /// A matched variant's own original price wins even when it is absent.
    pub fn variant_original_price(&self, color: Option<&str>, size: Option<&str>) -> Option<Money> {
        match self.matching_variant(color, size) {
            Some(v) => v.original_price,
            None => self.original_price,
        }
    }

    /// Stock status for a selection, falling back to the product flag.
    pub fn is_variant_in_stock(&self, color: Option<&str>, size: Option<&str>) -> bool {
        self.matching_variant(color, size)
            .map(|v| v.in_stock)
            .unwrap_or(self.in_stock)
    }

    /// Price range across the variant table, or the base price twice.
    pub fn price_range(&self) -> PriceRange {
        let mut prices = self.variants.iter().map(|v| v.price);
        let Some(first) = prices.next() else {
            return PriceRange {
                min: self.price,
                max: self.price,
            };
        };

        prices.fold(PriceRange { min: first, max: first }, |range, price| PriceRange {
            min: if price.amount_cents < range.min.amount_cents { price } else { range.min },
            max: if price.amount_cents > range.max.amount_cents { price } else { range.max },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn shirt() -> Product {
        let mut product = Product::new(
            "prod-1",
            "Linen Shirt 1",
            Money::usd(29),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        product.original_price = Some(Money::usd(49));
        product.variants = vec![
            ProductVariant::new("black", "S", Money::usd(34)).with_original_price(Money::usd(54)),
            ProductVariant::new("black", "M", Money::usd(32)),
            ProductVariant::new("black", "L", Money::usd(36)).sold_out(),
            ProductVariant::new("white", "S", Money::usd(31)),
            ProductVariant::new("navy", "XL", Money::usd(37)).sold_out(),
        ];
        product
    }

    #[test]
    fn test_no_selection_uses_base_values() {
        let product = shirt();
        assert_eq!(product.variant_price(None, None), Money::usd(29));
        assert_eq!(product.variant_price(Some(""), Some("")), Money::usd(29));
        assert_eq!(product.variant_original_price(None, None), Some(Money::usd(49)));
    }

    #[test]
    fn test_no_variant_table_uses_base_values() {
        let mut product = shirt();
        product.variants.clear();
        product.in_stock = false;
        assert_eq!(product.variant_price(Some("black"), Some("S")), Money::usd(29));
        assert!(!product.is_variant_in_stock(Some("black"), Some("S")));
    }

    #[test]
    fn test_exact_match_wins() {
        let product = shirt();
        assert_eq!(product.variant_price(Some("black"), Some("M")), Money::usd(32));
        assert!(!product.is_variant_in_stock(Some("black"), Some("L")));
    }

    #[test]
    fn test_color_fallback_before_size_fallback() {
        let product = shirt();
        // No white/XL: the first white variant governs, not navy/XL.
        assert_eq!(product.variant_price(Some("white"), Some("XL")), Money::usd(31));
        assert!(product.is_variant_in_stock(Some("white"), Some("XL")));
    }

    #[test]
    fn test_size_fallback() {
        let product = shirt();
        assert_eq!(product.variant_price(Some("beige"), Some("XL")), Money::usd(37));
        assert_eq!(product.variant_price(None, Some("S")), Money::usd(34));
        assert!(!product.is_variant_in_stock(None, Some("XL")));
    }

    #[test]
    fn test_unmatched_selection_uses_base_values() {
        let product = shirt();
        assert_eq!(product.variant_price(Some("beige"), Some("XS")), Money::usd(29));
        assert!(product.is_variant_in_stock(Some("beige"), Some("XS")));
    }

    #[test]
    fn test_matched_variant_original_price_may_be_absent() {
        let product = shirt();
        assert_eq!(product.variant_original_price(Some("black"), Some("S")), Some(Money::usd(54)));
        assert_eq!(product.variant_original_price(Some("black"), Some("M")), None);
    }

    #[test]
    fn test_price_range() {
        let product = shirt();
        let range = product.price_range();
        assert_eq!(range.min, Money::usd(31));
        assert_eq!(range.max, Money::usd(37));

        let mut plain = shirt();
        plain.variants.clear();
        assert!(plain.price_range().is_single());
    }
}
