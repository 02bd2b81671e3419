//! Storefront domain logic.
//!
//! This crate holds the parts of the storefront that are plain business
//! logic, independent of any rendering layer:
//!
//! - **Catalog**: Products, variants, categories, variant-aware price lookups
//! - **Search**: Raw URL parameters to a structured query, filtering, sorting
//! - **Cart**: Line items keyed by variant, coupon validation, derived totals
//! - **Wishlist**: A de-duplicated list of saved products
//!
//! # Example
//!
//! ```rust
//! use storefront_commerce::prelude::*;
//!
//! let catalog = storefront_commerce::catalog::seed::demo_catalog();
//!
//! // Query the catalog the way the shop page does
//! let params = RawParams::from_query_string("brand=Arc&sortBy=price-low-high");
//! let query = parse_query(&params);
//! let results = filter_products(&catalog.products, &query);
//! assert!(results.iter().all(|p| p.brand == "Arc"));
//!
//! // Put the cheapest one in the cart
//! let mut store = CartStore::new(catalog.coupon_book());
//! store.add(results[0].clone(), 2, None, None).unwrap();
//! let totals = store.totals().unwrap();
//! assert_eq!(totals.total_quantity, 2);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod cart;
pub mod search;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Catalog, Category, Product, ProductVariant, SubCategory};

    // Cart
    pub use crate::cart::{
        AppliedCoupon, CartAction, CartNotice, CartState, CartStore, CartTotals, Coupon,
        CouponBook, CouponContext, CouponRejection, CouponValue, LineItem, OrderLine, OrderSummary,
        Transition, VariantKey,
    };

    // Search
    pub use crate::search::{
        filter_products, parse_query, Filter, ParamValue, ProductQuery, RawParams, SortOption,
    };

    // Wishlist
    pub use crate::wishlist::{WishlistAction, WishlistState};
}
