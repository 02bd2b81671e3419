//! Product catalog module.
//!
//! Contains types for products, variants, categories, and variant-aware
//! price lookups.

mod catalog;
mod category;
mod product;
mod variant;
pub mod seed;

pub use catalog::Catalog;
pub use category::{Category, SubCategory};
pub use product::{Product, ProductVariant};
pub use variant::PriceRange;
