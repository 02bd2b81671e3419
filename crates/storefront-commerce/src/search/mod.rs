//! Search module.
//!
//! Turns raw URL parameters into a [`ProductQuery`] and evaluates it
//! against a product list.

mod filter;
mod params;
mod query;

pub use filter::{filter_products, Filter};
pub use params::{ParamValue, RawParams};
pub use query::{parse_query, ProductQuery, SortOption};
