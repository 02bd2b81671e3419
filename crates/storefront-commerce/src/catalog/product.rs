//! Product and variant types.

use crate::ids::ProductId;
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
    /// Base price, used when no variant overrides it.
    pub price: Money,
    /// Price before markdown, if the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Category slug (e.g., "men").
    pub category: String,
    /// Sub-category slug (e.g., "tops").
    pub sub_category: String,
    pub brand: String,
    pub material: String,
    /// Colors the product is offered in.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Sizes the product is offered in.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Average rating (0-5).
    #[serde(default)]
    pub rating: f32,
    /// Number of reviews; doubles as the sales-rank signal.
    #[serde(default)]
    pub reviews: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
    #[serde(default)]
    pub clearance: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Per color/size overrides. Empty means the product has no variant table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create a product with the required fields; everything else is empty.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            original_price: None,
            images: Vec::new(),
            category: String::new(),
            sub_category: String::new(),
            brand: String::new(),
            material: String::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            rating: 0.0,
            reviews: 0,
            in_stock: true,
            featured: false,
            new_arrival: false,
            clearance: false,
            tags: Vec::new(),
            variants: Vec::new(),
            created_at,
        }
    }

    /// Check if this product has a variant table.
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Check if the base price is marked down from the original price.
    pub fn is_on_sale(&self) -> bool {
        self.original_price
            .map(|op| op.amount_cents > self.price.amount_cents)
            .unwrap_or(false)
    }

    /// Calculate the markdown percentage if on sale.
    pub fn discount_percentage(&self) -> Option<f64> {
        self.original_price.and_then(|op| {
            if op.amount_cents > self.price.amount_cents {
                let savings = op.amount_cents - self.price.amount_cents;
                Some((savings as f64 / op.amount_cents as f64) * 100.0)
            } else {
                None
            }
        })
    }
}

/// A product variant: one color/size combination with its own price and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub color: String,
    pub size: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    pub in_stock: bool,
}

impl ProductVariant {
    /// Create an in-stock variant without an original price.
    pub fn new(color: impl Into<String>, size: impl Into<String>, price: Money) -> Self {
        Self {
            color: color.into(),
            size: size.into(),
            price,
            original_price: None,
            in_stock: true,
        }
    }

    /// Mark this variant as sold out.
    pub fn sold_out(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Set the original (pre-markdown) price.
    pub fn with_original_price(mut self, original: Money) -> Self {
        self.original_price = Some(original);
        self
    }
}
