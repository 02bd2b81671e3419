//! The catalog: products, categories and the coupon catalog, loaded together.

use std::collections::HashSet;

use crate::cart::{Coupon, CouponBook, CouponValue};
use crate::catalog::{Category, Product};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// Static storefront data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

impl Catalog {
    /// Parse a catalog from JSON and validate it.
    pub fn from_json(content: &str) -> Result<Self, CommerceError> {
        let catalog: Catalog = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from TOML and validate it.
    pub fn from_toml(content: &str) -> Result<Self, CommerceError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the invariants the query and cart engines rely on.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut ids = HashSet::new();
        for product in &self.products {
            if !ids.insert(&product.id) {
                return Err(CommerceError::ValidationError(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
            if product.price.is_negative() || product.variants.iter().any(|v| v.price.is_negative()) {
                return Err(CommerceError::ValidationError(format!(
                    "negative price on product {}",
                    product.id
                )));
            }
        }

        if let Some(currency) = self.currency() {
            let prices = self.products.iter().flat_map(|p| {
                std::iter::once(p.price)
                    .chain(p.original_price)
                    .chain(p.variants.iter().flat_map(|v| std::iter::once(v.price).chain(v.original_price)))
            });
            let coupon_amounts = self.coupons.iter().flat_map(|c| {
                let value_amount = match &c.value {
                    CouponValue::Percentage { max_discount, .. } => *max_discount,
                    CouponValue::Fixed { amount } => Some(*amount),
                };
                c.min_amount.into_iter().chain(value_amount)
            });
            if let Some(other) = prices.chain(coupon_amounts).find(|m| m.currency != currency) {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: other.currency.code().to_string(),
                });
            }
        }

        let mut codes = HashSet::new();
        for coupon in &self.coupons {
            if !codes.insert(coupon.code.to_uppercase()) {
                return Err(CommerceError::ValidationError(format!(
                    "duplicate coupon code {}",
                    coupon.code
                )));
            }
            validate_coupon(coupon)?;
        }

        Ok(())
    }

    /// The catalog currency, taken from the first product.
    pub fn currency(&self) -> Option<Currency> {
        self.products.first().map(|p| p.price.currency)
    }

    /// Get a product by ID.
    pub fn product(&self, id: &ProductId) -> Result<&Product, CommerceError> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    /// Get a category by slug.
    pub fn category(&self, slug: &str) -> Result<&Category, CommerceError> {
        self.categories
            .iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| CommerceError::CategoryNotFound(slug.to_string()))
    }

    /// Build the coupon lookup used by the cart.
    pub fn coupon_book(&self) -> CouponBook {
        CouponBook::new(self.coupons.clone())
    }

    /// Distinct brands, in catalog order.
    pub fn brands(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.brand.as_str()))
    }

    /// Distinct materials, in catalog order.
    pub fn materials(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.material.as_str()))
    }

    /// Distinct colors, in catalog order.
    pub fn colors(&self) -> Vec<String> {
        distinct(self.products.iter().flat_map(|p| p.colors.iter().map(String::as_str)))
    }

    /// Distinct sizes, in catalog order.
    pub fn sizes(&self) -> Vec<String> {
        distinct(self.products.iter().flat_map(|p| p.sizes.iter().map(String::as_str)))
    }
}

fn validate_coupon(coupon: &Coupon) -> Result<(), CommerceError> {
    let invalid = |what: &str| -> Result<(), CommerceError> {
        Err(CommerceError::ValidationError(format!(
            "coupon {}: {}",
            coupon.code, what
        )))
    };

    if coupon.valid_from > coupon.valid_to {
        return invalid("valid_from is after valid_to");
    }
    if coupon.min_amount.is_some_and(|m| m.is_negative()) {
        return invalid("negative minimum amount");
    }
    match &coupon.value {
        CouponValue::Percentage { percent, max_discount } => {
            if !percent.is_finite() || *percent < 0.0 {
                return invalid("percent must be a non-negative number");
            }
            if max_discount.is_some_and(|cap| cap.is_negative()) {
                return invalid("negative max discount");
            }
        }
        CouponValue::Fixed { amount } => {
            if amount.is_negative() {
                return invalid("negative fixed amount");
            }
        }
    }

    Ok(())
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}
