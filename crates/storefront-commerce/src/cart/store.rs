//! A cart holder that owns the state and dispatches actions to the reducer.

use chrono::{DateTime, Utc};

use crate::cart::{
    CartAction, CartNotice, CartState, CartTotals, CouponBook, CouponContext, OrderLine,
    OrderSummary, VariantKey,
};
use crate::catalog::Product;
use crate::error::CommerceError;

/// Owns a [`CartState`] and replaces it with each transition.
#[derive(Debug, Clone)]
pub struct CartStore {
    state: CartState,
    coupons: CouponBook,
    clock: fn() -> DateTime<Utc>,
}

impl CartStore {
    /// Create an empty cart backed by the given coupon catalog.
    pub fn new(coupons: CouponBook) -> Self {
        Self {
            state: CartState::default(),
            coupons,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to validate coupons.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Run an action through the reducer. On error the state is left as it was.
    pub fn dispatch(&mut self, action: CartAction) -> Result<Option<CartNotice>, CommerceError> {
        let ctx = CouponContext {
            coupons: &self.coupons,
            now: (self.clock)(),
        };
        let transition = self.state.reduce(action, &ctx)?;
        self.state = transition.state;
        Ok(transition.notice)
    }

    pub fn add(
        &mut self,
        product: Product,
        quantity: i64,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<Option<CartNotice>, CommerceError> {
        self.dispatch(CartAction::Add {
            product: Box::new(product),
            quantity,
            color: color.map(str::to_string),
            size: size.map(str::to_string),
        })
    }

    pub fn remove(&mut self, key: &VariantKey) -> Result<Option<CartNotice>, CommerceError> {
        self.dispatch(CartAction::Remove { key: key.clone() })
    }

    pub fn clear(&mut self) -> Result<Option<CartNotice>, CommerceError> {
        self.dispatch(CartAction::Clear)
    }

    /// Apply a coupon against the current subtotal.
    pub fn apply_coupon(&mut self, code: &str) -> Result<Option<CartNotice>, CommerceError> {
        let subtotal = self.state.totals()?.subtotal;
        self.dispatch(CartAction::ApplyCoupon {
            code: code.to_string(),
            subtotal,
        })
    }

    pub fn remove_coupon(&mut self) -> Result<Option<CartNotice>, CommerceError> {
        self.dispatch(CartAction::RemoveCoupon)
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        self.state.totals()
    }

    pub fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// Snapshot the cart as an order and empty it.
    pub fn place_order(&mut self) -> Result<OrderSummary, CommerceError> {
        if self.state.is_empty() {
            return Err(CommerceError::ValidationError("cart is empty".to_string()));
        }

        let lines = self
            .state
            .items
            .iter()
            .map(OrderLine::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        let totals = self.state.totals()?;
        let summary = OrderSummary {
            lines,
            coupon: self.state.applied_coupon.clone(),
            totals,
            placed_at: (self.clock)(),
        };

        tracing::info!(
            lines = summary.lines.len(),
            quantity = summary.totals.total_quantity,
            total = %summary.totals.final_price,
            "order placed"
        );

        self.state = CartState::default();
        Ok(summary)
    }
}
