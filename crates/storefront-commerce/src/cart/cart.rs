//! Cart state, line items and the cart reducer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{AppliedCoupon, CartTotals, CouponBook, CouponRejection};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

const NO_COLOR: &str = "no-color";
const NO_SIZE: &str = "no-size";

/// Identity of a cart line: product plus selected color and size.
///
/// Compared field by field, so ids or colors containing `-` never collide.
/// Displayed as `{productId}-{color}-{size}` with `no-color` / `no-size`
/// standing in for an unselected attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantKey {
    pub product_id: ProductId,
    /// Selected color; an empty selection is stored as `None`.
    #[serde(default)]
    pub color: Option<String>,
    /// Selected size; an empty selection is stored as `None`.
    #[serde(default)]
    pub size: Option<String>,
}

impl VariantKey {
    pub fn new(product_id: &ProductId, color: Option<&str>, size: Option<&str>) -> Self {
        Self {
            product_id: product_id.clone(),
            color: selection(color).map(str::to_string),
            size: selection(size).map(str::to_string),
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.product_id,
            self.color.as_deref().unwrap_or(NO_COLOR),
            self.size.as_deref().unwrap_or(NO_SIZE)
        )
    }
}

fn selection(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub key: VariantKey,
    pub product_id: ProductId,
    /// Product as it was when first added.
    pub product: Product,
    pub color: Option<String>,
    pub size: Option<String>,
    /// Always at least 1.
    pub quantity: i64,
    /// Unit price resolved for the variant when the line was created.
    pub variant_price: Money,
}

impl LineItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.variant_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// An action the cart reducer understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Add a product, or increase the quantity of its existing line.
    Add {
        product: Box<Product>,
        #[serde(default = "default_quantity")]
        quantity: i64,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        size: Option<String>,
    },
    /// Remove a line. Removing a missing line changes nothing.
    Remove { key: VariantKey },
    /// Empty the cart and drop any coupon.
    Clear,
    /// Validate a coupon code against the given subtotal.
    ApplyCoupon { code: String, subtotal: Money },
    /// Drop the applied coupon and any coupon error.
    RemoveCoupon,
}

fn default_quantity() -> i64 {
    1
}

/// A user-facing message describing what a transition did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartNotice {
    Added {
        key: VariantKey,
        name: String,
        quantity: i64,
    },
    Incremented {
        key: VariantKey,
        name: String,
        added: i64,
        quantity: i64,
    },
    Removed { key: VariantKey },
    Cleared,
    CouponApplied { code: String, discount: Money },
    CouponRejected { rejection: CouponRejection },
    CouponRemoved { code: String },
}

impl fmt::Display for CartNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartNotice::Added { name, quantity, .. } => {
                write!(f, "Added {} x{} to cart", name, quantity)
            }
            CartNotice::Incremented { name, quantity, .. } => {
                write!(f, "Updated {} quantity to {}", name, quantity)
            }
            CartNotice::Removed { key } => write!(f, "Removed {} from cart", key),
            CartNotice::Cleared => write!(f, "Cart cleared"),
            CartNotice::CouponApplied { code, discount } => {
                write!(f, "Coupon {} applied: {} off", code, discount)
            }
            CartNotice::CouponRejected { rejection } => write!(f, "{}", rejection),
            CartNotice::CouponRemoved { code } => write!(f, "Coupon {} removed", code),
        }
    }
}

/// What the reducer needs besides the state: the coupon catalog and the time.
#[derive(Debug, Clone, Copy)]
pub struct CouponContext<'a> {
    pub coupons: &'a CouponBook,
    pub now: DateTime<Utc>,
}

/// Result of one reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: CartState,
    pub notice: Option<CartNotice>,
}

impl Transition {
    fn unchanged(state: &CartState) -> Self {
        Self {
            state: state.clone(),
            notice: None,
        }
    }
}

/// Cart contents plus the coupon slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub items: Vec<LineItem>,
    pub applied_coupon: Option<AppliedCoupon>,
    /// Why the last coupon attempt failed, if it did.
    pub coupon_error: Option<CouponRejection>,
}

impl CartState {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the next state for an action. `self` is never modified.
    pub fn reduce(
        &self,
        action: CartAction,
        ctx: &CouponContext<'_>,
    ) -> Result<Transition, CommerceError> {
        match action {
            CartAction::Add {
                product,
                quantity,
                color,
                size,
            } => self.add(*product, quantity, color, size),
            CartAction::Remove { key } => Ok(self.remove(&key)),
            CartAction::Clear => {
                tracing::debug!(lines = self.items.len(), "cart cleared");
                Ok(Transition {
                    state: CartState::default(),
                    notice: Some(CartNotice::Cleared),
                })
            }
            CartAction::ApplyCoupon { code, subtotal } => Ok(self.apply_coupon(&code, &subtotal, ctx)),
            CartAction::RemoveCoupon => Ok(self.remove_coupon()),
        }
    }

    fn add(
        &self,
        product: Product,
        quantity: i64,
        color: Option<String>,
        size: Option<String>,
    ) -> Result<Transition, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let color = color.filter(|c| !c.is_empty());
        let size = size.filter(|s| !s.is_empty());
        let key = VariantKey::new(&product.id, color.as_deref(), size.as_deref());
        let unit_price = product.variant_price(color.as_deref(), size.as_deref());

        if let Some(first) = self.items.first() {
            if first.variant_price.currency != unit_price.currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: first.variant_price.currency.code().to_string(),
                    got: unit_price.currency.code().to_string(),
                });
            }
        }

        let mut next = self.clone();

        if let Some(existing) = next.items.iter_mut().find(|i| i.key == key) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            tracing::debug!(key = %key, quantity = new_quantity, "cart line incremented");
            let notice = CartNotice::Incremented {
                key,
                name: existing.product.name.clone(),
                added: quantity,
                quantity: new_quantity,
            };
            return Ok(Transition {
                state: next,
                notice: Some(notice),
            });
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        tracing::debug!(key = %key, quantity, price = %unit_price, "cart line added");
        let notice = CartNotice::Added {
            key: key.clone(),
            name: product.name.clone(),
            quantity,
        };
        next.items.push(LineItem {
            key,
            product_id: product.id.clone(),
            product,
            color,
            size,
            quantity,
            variant_price: unit_price,
        });

        Ok(Transition {
            state: next,
            notice: Some(notice),
        })
    }

    fn remove(&self, key: &VariantKey) -> Transition {
        if self.item(key).is_none() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.items.retain(|i| &i.key != key);
        tracing::debug!(key = %key, "cart line removed");
        Transition {
            state: next,
            notice: Some(CartNotice::Removed { key: key.clone() }),
        }
    }

    fn apply_coupon(&self, code: &str, subtotal: &Money, ctx: &CouponContext<'_>) -> Transition {
        let mut next = self.clone();

        match ctx.coupons.apply(code, subtotal, ctx.now) {
            Ok(applied) => {
                tracing::info!(
                    code = %applied.coupon.code,
                    subtotal = %subtotal,
                    discount = %applied.discount_amount,
                    "coupon applied"
                );
                let notice = CartNotice::CouponApplied {
                    code: applied.coupon.code.clone(),
                    discount: applied.discount_amount,
                };
                next.applied_coupon = Some(applied);
                next.coupon_error = None;
                Transition {
                    state: next,
                    notice: Some(notice),
                }
            }
            Err(rejection) => {
                tracing::warn!(code, reason = rejection.reason(), "coupon rejected");
                next.applied_coupon = None;
                next.coupon_error = Some(rejection.clone());
                Transition {
                    state: next,
                    notice: Some(CartNotice::CouponRejected { rejection }),
                }
            }
        }
    }

    fn remove_coupon(&self) -> Transition {
        if self.applied_coupon.is_none() && self.coupon_error.is_none() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        let removed = next.applied_coupon.take();
        next.coupon_error = None;
        Transition {
            state: next,
            notice: removed.map(|applied| CartNotice::CouponRemoved {
                code: applied.coupon.code,
            }),
        }
    }

    /// Get a line by key.
    pub fn item(&self, key: &VariantKey) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.key == key)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart: that of its lines, else of the applied coupon.
    pub fn currency(&self) -> Currency {
        self.items
            .first()
            .map(|i| i.variant_price.currency)
            .or_else(|| self.applied_coupon.as_ref().map(|a| a.final_price.currency))
            .unwrap_or_default()
    }

    /// Derived totals: quantity, subtotal, discount and final price.
    ///
    /// The discount is the one stored when the coupon was applied.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        let currency = self.currency();

        let total_quantity = self
            .items
            .iter()
            .try_fold(0_i64, |acc, i| acc.checked_add(i.quantity))
            .ok_or(CommerceError::Overflow)?;

        let line_totals = self
            .items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = Money::try_sum(line_totals.iter(), currency).ok_or(CommerceError::Overflow)?;

        let discount_amount = self
            .applied_coupon
            .as_ref()
            .map(|a| a.discount_amount)
            .unwrap_or(Money::zero(currency));

        if discount_amount.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: discount_amount.currency.code().to_string(),
            });
        }
        let final_price = subtotal
            .try_subtract(&discount_amount)
            .ok_or(CommerceError::Overflow)?;

        Ok(CartTotals {
            line_count: self.items.len(),
            total_quantity,
            subtotal,
            discount_amount,
            final_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Coupon, CouponValue};
    use crate::catalog::ProductVariant;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn coupons() -> CouponBook {
        CouponBook::new(vec![Coupon::new(
            "SAVE10",
            CouponValue::Percentage {
                percent: 10.0,
                max_discount: Some(Money::usd(100)),
            },
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2027, 12, 31, 0, 0, 0).unwrap(),
        )
        .with_min_amount(Money::usd(50))])
    }

    fn tee() -> Product {
        let mut product = Product::new("prod-1", "Cotton Tee", Money::usd(20), now());
        product.variants = vec![
            ProductVariant::new("black", "M", Money::usd(25)),
            ProductVariant::new("white", "M", Money::usd(22)),
        ];
        product
    }

    fn add(product: Product, quantity: i64, color: Option<&str>, size: Option<&str>) -> CartAction {
        CartAction::Add {
            product: Box::new(product),
            quantity,
            color: color.map(str::to_string),
            size: size.map(str::to_string),
        }
    }

    fn run(state: &CartState, action: CartAction) -> Transition {
        let book = coupons();
        let ctx = CouponContext { coupons: &book, now: now() };
        state.reduce(action, &ctx).unwrap()
    }

    #[test]
    fn test_variant_key_format() {
        let id = ProductId::new("prod-1");
        assert_eq!(VariantKey::new(&id, Some("black"), Some("M")).to_string(), "prod-1-black-M");
        assert_eq!(VariantKey::new(&id, None, Some("")).to_string(), "prod-1-no-color-no-size");
        assert_eq!(VariantKey::new(&id, Some(""), None), VariantKey::new(&id, None, None));
    }

    #[test]
    fn test_variant_keys_with_dashes_stay_distinct() {
        let id = ProductId::new("tee");
        let a = VariantKey::new(&id, Some("black-M"), None);
        let b = VariantKey::new(&id, Some("black"), Some("M-no-size"));
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);

        let shirt = VariantKey::new(&ProductId::new("shirt"), Some("navy-blue"), None);
        let shirt_navy = VariantKey::new(&ProductId::new("shirt-navy"), Some("blue"), None);
        assert_ne!(shirt, shirt_navy);
    }

    #[test]
    fn test_add_new_line_captures_variant_price() {
        let t = run(&CartState::new(), add(tee(), 2, Some("black"), Some("M")));
        assert_eq!(t.state.items.len(), 1);
        assert_eq!(t.state.items[0].variant_price, Money::usd(25));
        assert_eq!(t.state.items[0].quantity, 2);
        assert!(matches!(t.notice, Some(CartNotice::Added { quantity: 2, .. })));
    }

    #[test]
    fn test_add_same_variant_increments() {
        let first = run(&CartState::new(), add(tee(), 1, Some("black"), Some("M")));
        let second = run(&first.state, add(tee(), 3, Some("black"), Some("M")));
        assert_eq!(second.state.items.len(), 1);
        assert_eq!(second.state.items[0].quantity, 4);
        assert!(matches!(
            second.notice,
            Some(CartNotice::Incremented { added: 3, quantity: 4, .. })
        ));
    }

    #[test]
    fn test_add_different_variants_makes_separate_lines() {
        let first = run(&CartState::new(), add(tee(), 1, Some("black"), Some("M")));
        let second = run(&first.state, add(tee(), 2, Some("white"), Some("M")));
        assert_eq!(second.state.items.len(), 2);
        assert_eq!(second.state.items[0].quantity, 1);
        assert_eq!(second.state.items[1].quantity, 2);
        assert_eq!(second.state.items[1].variant_price, Money::usd(22));
    }

    #[test]
    fn test_price_captured_at_add_time() {
        let first = run(&CartState::new(), add(tee(), 1, None, None));
        let mut repriced = tee();
        repriced.price = Money::usd(99);
        let second = run(&first.state, add(repriced, 1, None, None));
        assert_eq!(second.state.items[0].variant_price, Money::usd(20));
        assert_eq!(second.state.totals().unwrap().subtotal, Money::usd(40));
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = run(&CartState::new(), add(tee(), 1, None, None)).state;
        let before = state.clone();
        let _ = run(&state, add(tee(), 1, None, None));
        let _ = run(&state, CartAction::Clear);
        assert_eq!(state, before);
    }

    #[test]
    fn test_invalid_quantity() {
        let book = coupons();
        let ctx = CouponContext { coupons: &book, now: now() };
        let result = CartState::new().reduce(add(tee(), 0, None, None), &ctx);
        assert_eq!(result, Err(CommerceError::InvalidQuantity(0)));
    }

    #[test]
    fn test_quantity_limit() {
        let book = coupons();
        let ctx = CouponContext { coupons: &book, now: now() };
        let state = CartState::new()
            .reduce(add(tee(), MAX_QUANTITY_PER_ITEM, None, None), &ctx)
            .unwrap()
            .state;
        let result = state.reduce(add(tee(), 1, None, None), &ctx);
        assert!(matches!(result, Err(CommerceError::QuantityExceedsLimit(..))));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let book = coupons();
        let ctx = CouponContext { coupons: &book, now: now() };
        let state = CartState::new().reduce(add(tee(), 1, None, None), &ctx).unwrap().state;
        let mut euro = Product::new("prod-eu", "Euro Tee", Money::new(2000, Currency::EUR), now());
        euro.variants.clear();
        let result = state.reduce(add(euro, 1, None, None), &ctx);
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let state = run(&CartState::new(), add(tee(), 1, None, None)).state;
        let key = VariantKey::new(&ProductId::new("prod-404"), None, None);
        let t = run(&state, CartAction::Remove { key });
        assert_eq!(t.state, state);
        assert!(t.notice.is_none());
    }

    #[test]
    fn test_remove_line() {
        let state = run(&CartState::new(), add(tee(), 1, Some("white"), Some("M"))).state;
        let key = state.items[0].key.clone();
        let t = run(&state, CartAction::Remove { key });
        assert!(t.state.is_empty());
    }

    #[test]
    fn test_totals() {
        let s1 = run(&CartState::new(), add(tee(), 2, Some("black"), Some("M"))).state;
        let s2 = run(&s1, add(tee(), 1, None, None)).state;
        let totals = s2.totals().unwrap();
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.subtotal, Money::usd(70));
        assert_eq!(totals.discount_amount, Money::usd(0));
        assert_eq!(totals.final_price, Money::usd(70));
    }

    #[test]
    fn test_apply_coupon_and_totals() {
        let state = run(&CartState::new(), add(tee(), 3, None, None)).state;
        let t = run(
            &state,
            CartAction::ApplyCoupon {
                code: "save10".to_string(),
                subtotal: Money::usd(60),
            },
        );
        let applied = t.state.applied_coupon.as_ref().unwrap();
        assert_eq!(applied.discount_amount, Money::usd(6));
        assert_eq!(t.state.totals().unwrap().final_price, Money::usd(54));
        assert!(t.state.coupon_error.is_none());
    }

    #[test]
    fn test_rejected_coupon_clears_previous_coupon() {
        let state = run(&CartState::new(), add(tee(), 3, None, None)).state;
        let applied = run(
            &state,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(60),
            },
        )
        .state;
        let t = run(
            &applied,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(40),
            },
        );
        assert!(t.state.applied_coupon.is_none());
        assert_eq!(t.state.coupon_error.as_ref().map(|r| r.reason()), Some("below-minimum-amount"));
    }

    #[test]
    fn test_applied_coupon_is_not_revalidated() {
        let state = run(&CartState::new(), add(tee(), 3, None, None)).state;
        let applied = run(
            &state,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(60),
            },
        )
        .state;
        let key = applied.items[0].key.clone();
        let emptied = run(&applied, CartAction::Remove { key }).state;
        let totals = emptied.totals().unwrap();
        assert_eq!(totals.subtotal, Money::usd(0));
        assert_eq!(totals.discount_amount, Money::usd(6));
        assert_eq!(totals.final_price, Money::usd(-6));
    }

    #[test]
    fn test_totals_overflow_is_reported_as_overflow() {
        let mut state = run(&CartState::new(), add(tee(), 1, None, None)).state;
        state.applied_coupon = Some(AppliedCoupon {
            coupon: coupons().find("SAVE10").cloned().unwrap(),
            discount_amount: Money::new(i64::MIN, Currency::USD),
            final_price: Money::usd(0),
        });
        assert_eq!(state.totals(), Err(CommerceError::Overflow));
    }

    #[test]
    fn test_totals_discount_in_other_currency() {
        let mut state = run(&CartState::new(), add(tee(), 1, None, None)).state;
        state.applied_coupon = Some(AppliedCoupon {
            coupon: coupons().find("SAVE10").cloned().unwrap(),
            discount_amount: Money::new(100, Currency::EUR),
            final_price: Money::usd(0),
        });
        assert!(matches!(
            state.totals(),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_coupon_is_idempotent() {
        let state = run(&CartState::new(), add(tee(), 3, None, None)).state;
        let applied = run(
            &state,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(60),
            },
        )
        .state;
        let once = run(&applied, CartAction::RemoveCoupon);
        assert!(matches!(once.notice, Some(CartNotice::CouponRemoved { .. })));
        let twice = run(&once.state, CartAction::RemoveCoupon);
        assert_eq!(twice.state, once.state);
        assert!(twice.notice.is_none());
    }

    #[test]
    fn test_clear_drops_items_and_coupon() {
        let state = run(&CartState::new(), add(tee(), 3, None, None)).state;
        let applied = run(
            &state,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(60),
            },
        )
        .state;
        let cleared = run(&applied, CartAction::Clear).state;
        assert_eq!(cleared, CartState::new());
    }

    #[test]
    fn test_action_json() {
        let json = r#"{"type": "apply_coupon", "code": "SAVE10", "subtotal": {"amount_cents": 6000}}"#;
        let action: CartAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            CartAction::ApplyCoupon {
                code: "SAVE10".to_string(),
                subtotal: Money::usd(60)
            }
        );
    }
}
