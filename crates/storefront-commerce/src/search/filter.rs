//! Search filter predicates and the filter/sort pass over a product list.

use std::cmp::Ordering;

use crate::catalog::Product;
use crate::search::{ProductQuery, SortOption};
use serde::{Deserialize, Serialize};

/// A single product predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on name, brand, category,
    /// sub-category or material. Holds the lowercased term.
    Text(String),
    /// Exact category slug.
    Category(String),
    /// Exact sub-category slug.
    SubCategory(String),
    /// Brand must be one of these.
    Brands(Vec<String>),
    /// Material must be one of these.
    Materials(Vec<String>),
    /// Product must be offered in at least one of these colors.
    Colors(Vec<String>),
    /// Product must be offered in at least one of these sizes.
    Sizes(Vec<String>),
    /// Base price within inclusive bounds.
    PriceRange { min: Option<f64>, max: Option<f64> },
}

impl Filter {
    /// Create a text search filter.
    pub fn text(term: &str) -> Self {
        Filter::Text(term.to_lowercase())
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<f64>, max: Option<f64>) -> Self {
        Filter::PriceRange { min, max }
    }

    /// Check whether a product satisfies this filter.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::Text(term) => [
                &product.name,
                &product.brand,
                &product.category,
                &product.sub_category,
                &product.material,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(term.as_str())),
            Filter::Category(slug) => &product.category == slug,
            Filter::SubCategory(slug) => &product.sub_category == slug,
            Filter::Brands(brands) => brands.contains(&product.brand),
            Filter::Materials(materials) => materials.contains(&product.material),
            Filter::Colors(colors) => colors.iter().any(|c| product.colors.contains(c)),
            Filter::Sizes(sizes) => sizes.iter().any(|s| product.sizes.contains(s)),
            Filter::PriceRange { min, max } => {
                let price = product.price.to_decimal();
                min.map_or(true, |min| price >= min) && max.map_or(true, |max| price <= max)
            }
        }
    }
}

impl ProductQuery {
    /// Check whether a product satisfies every active filter.
    pub fn matches(&self, product: &Product) -> bool {
        self.filters().iter().all(|f| f.matches(product))
    }
}

impl SortOption {
    /// Ordering of two products under this sort. Ties compare equal so
    /// that a stable sort keeps catalog order.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOption::Newest => b.created_at.cmp(&a.created_at),
            SortOption::TopSells => b.reviews.cmp(&a.reviews),
            SortOption::PriceLowHigh => a.price.to_decimal().total_cmp(&b.price.to_decimal()),
            SortOption::PriceHighLow => b.price.to_decimal().total_cmp(&a.price.to_decimal()),
        }
    }
}

/// Filter and sort a product list.
///
/// The input is left untouched; the result borrows from it. Calling this
/// again with the same inputs yields the same sequence. An empty result
/// is not an error.
pub fn filter_products<'a>(products: &'a [Product], query: &ProductQuery) -> Vec<&'a Product> {
    let filters = query.filters();
    let mut result: Vec<&Product> = products
        .iter()
        .filter(|p| filters.iter().all(|f| f.matches(p)))
        .collect();

    result.sort_by(|a, b| query.sort_by.compare(a, b));

    tracing::debug!(
        filters = filters.len(),
        sort = query.sort_by.as_str(),
        candidates = products.len(),
        matched = result.len(),
        "filtered products"
    );

    result
}
