//! Shopping cart module.
//!
//! The cart is a pure reducer over [`CartState`]; [`CartStore`] holds the
//! current state and the coupon catalog.

mod cart;
mod coupon;
mod pricing;
mod store;

pub use cart::{
    CartAction, CartNotice, CartState, CouponContext, LineItem, Transition, VariantKey,
    MAX_QUANTITY_PER_ITEM,
};
pub use coupon::{AppliedCoupon, Coupon, CouponBook, CouponRejection, CouponValue};
pub use pricing::{CartTotals, OrderLine, OrderSummary};
pub use store::CartStore;
