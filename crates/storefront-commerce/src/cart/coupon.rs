//! Coupon codes and their validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// What a coupon takes off the order.
///
/// Amounts are in the catalog currency; [`Catalog::validate`](crate::catalog::Catalog::validate)
/// keeps products and coupons on one currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponValue {
    /// Percentage of the subtotal, optionally capped.
    Percentage {
        percent: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_discount: Option<Money>,
    },
    /// Flat amount off.
    Fixed { amount: Money },
}

impl CouponValue {
    /// Calculate the discount for a subtotal.
    ///
    /// A fixed discount is not limited to the subtotal, so the final price
    /// can drop below zero.
    pub fn discount_for(&self, subtotal: &Money) -> Money {
        match self {
            CouponValue::Percentage { percent, max_discount } => {
                let discount = subtotal.percentage(*percent);
                match max_discount {
                    // A zero cap means no cap.
                    Some(cap) if cap.amount_cents > 0 && cap.amount_cents < discount.amount_cents => {
                        Money::new(cap.amount_cents, subtotal.currency)
                    }
                    _ => discount,
                }
            }
            CouponValue::Fixed { amount } => Money::new(amount.amount_cents, subtotal.currency),
        }
    }
}

/// A discount code with validity and usage constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Code the customer types; matched case-insensitively.
    pub code: String,
    pub value: CouponValue,
    /// Smallest subtotal the coupon applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Money>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// Maximum number of redemptions (None = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub description: String,
}

impl Coupon {
    /// Create an unlimited coupon without a minimum amount.
    pub fn new(
        code: impl Into<String>,
        value: CouponValue,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            value,
            min_amount: None,
            valid_from,
            valid_to,
            usage_limit: None,
            used_count: 0,
            description: String::new(),
        }
    }

    /// Require a minimum subtotal.
    pub fn with_min_amount(mut self, amount: Money) -> Self {
        self.min_amount = Some(amount);
        self
    }

    /// Set the usage limit and how often the coupon has been used.
    pub fn with_usage(mut self, limit: u32, used: u32) -> Self {
        self.usage_limit = Some(limit);
        self.used_count = used;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check if `now` falls inside the validity window (both ends inclusive).
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_to
    }

    /// Check if the usage limit has been reached. A limit of 0 means unlimited.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .filter(|&limit| limit > 0)
            .map(|limit| self.used_count >= limit)
            .unwrap_or(false)
    }

    /// Run the checks in order; the first failure decides the reason.
    pub fn check(&self, subtotal: &Money, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active_at(now) {
            return Err(CouponRejection::ExpiredOrNotYetValid);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::UsageLimitReached);
        }
        if let Some(minimum) = self.min_amount {
            if subtotal.amount_cents < minimum.amount_cents {
                return Err(CouponRejection::BelowMinimumAmount { minimum });
            }
        }
        Ok(())
    }
}

/// Why a coupon code was not applied. These are user-correctable, not faults.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum CouponRejection {
    #[error("Invalid coupon code")]
    NotFound,

    #[error("Coupon has expired or is not yet valid")]
    ExpiredOrNotYetValid,

    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    #[error("Minimum order amount of {minimum} required")]
    BelowMinimumAmount { minimum: Money },
}

impl CouponRejection {
    /// Classified reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            CouponRejection::NotFound => "not-found",
            CouponRejection::ExpiredOrNotYetValid => "expired-or-not-yet-valid",
            CouponRejection::UsageLimitReached => "usage-limit-reached",
            CouponRejection::BelowMinimumAmount { .. } => "below-minimum-amount",
        }
    }
}

/// A validated coupon with the discount it gave for the subtotal it was
/// validated against. Not recomputed when the cart changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    pub discount_amount: Money,
    pub final_price: Money,
}

/// The coupon catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    /// Find a coupon by code, ignoring case.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let wanted = code.to_uppercase();
        self.coupons.iter().find(|c| c.code.to_uppercase() == wanted)
    }

    /// Validate a code against a subtotal: existence, validity window,
    /// usage limit, then minimum amount.
    pub fn validate(
        &self,
        code: &str,
        subtotal: &Money,
        now: DateTime<Utc>,
    ) -> Result<&Coupon, CouponRejection> {
        let coupon = self.find(code).ok_or(CouponRejection::NotFound)?;
        coupon.check(subtotal, now)?;
        Ok(coupon)
    }

    /// Validate a code and compute the discount it gives.
    pub fn apply(
        &self,
        code: &str,
        subtotal: &Money,
        now: DateTime<Utc>,
    ) -> Result<AppliedCoupon, CouponRejection> {
        let coupon = self.validate(code, subtotal, now)?;
        let discount_amount = coupon.value.discount_for(subtotal);
        let final_price = Money::new(
            subtotal.amount_cents.saturating_sub(discount_amount.amount_cents),
            subtotal.currency,
        );

        Ok(AppliedCoupon {
            coupon: coupon.clone(),
            discount_amount,
            final_price,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }

    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn save10() -> Coupon {
        Coupon::new(
            "SAVE10",
            CouponValue::Percentage {
                percent: 10.0,
                max_discount: Some(Money::usd(100)),
            },
            at(2026, 1, 1),
            at(2027, 12, 31),
        )
        .with_min_amount(Money::usd(50))
        .with_usage(1000, 500)
    }

    fn book() -> CouponBook {
        CouponBook::new(vec![
            save10(),
            Coupon::new("FREESHIP", CouponValue::Fixed { amount: Money::usd(15) }, at(2026, 1, 1), at(2027, 12, 31))
                .with_min_amount(Money::usd(100)),
            Coupon::new("OLD", CouponValue::Fixed { amount: Money::usd(5) }, at(2020, 1, 1), at(2020, 12, 31)),
            Coupon::new("GONE", CouponValue::Fixed { amount: Money::usd(5) }, at(2026, 1, 1), at(2027, 12, 31))
                .with_usage(10, 10),
        ])
    }

    #[test]
    fn test_zero_usage_limit_is_unlimited() {
        let coupon = Coupon::new("ANY", CouponValue::Fixed { amount: Money::usd(5) }, at(2026, 1, 1), at(2027, 12, 31))
            .with_usage(0, 0);
        assert!(!coupon.is_exhausted());
        assert_eq!(coupon.check(&Money::usd(20), at(2026, 6, 1)), Ok(()));
    }

    #[test]
    fn test_zero_cap_is_no_cap() {
        let value = CouponValue::Percentage {
            percent: 10.0,
            max_discount: Some(Money::usd(0)),
        };
        assert_eq!(value.discount_for(&Money::usd(100)), Money::usd(10));
    }

    #[test]
    fn test_percentage_discount_below_cap() {
        let applied = book().apply("SAVE10", &Money::usd(600), at(2026, 6, 1)).unwrap();
        assert_eq!(applied.discount_amount, Money::usd(60));
        assert_eq!(applied.final_price, Money::usd(540));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let applied = book().apply("SAVE10", &Money::usd(1500), at(2026, 6, 1)).unwrap();
        assert_eq!(applied.discount_amount, Money::usd(100));
        assert_eq!(applied.final_price, Money::usd(1400));
    }

    #[test]
    fn test_fixed_discount_is_flat() {
        let applied = book().apply("freeship", &Money::usd(120), at(2026, 6, 1)).unwrap();
        assert_eq!(applied.discount_amount, Money::usd(15));
        assert_eq!(applied.final_price, Money::usd(105));
    }

    #[test]
    fn test_code_lookup_ignores_case() {
        assert!(book().find("save10").is_some());
        assert!(book().find("Save10").is_some());
        assert!(book().find("SAVE1").is_none());
    }

    #[test]
    fn test_rejection_reasons() {
        let book = book();
        let now = at(2026, 6, 1);
        assert_eq!(
            book.validate("NOPE", &Money::usd(600), now).unwrap_err(),
            CouponRejection::NotFound
        );
        assert_eq!(
            book.validate("OLD", &Money::usd(600), now).unwrap_err(),
            CouponRejection::ExpiredOrNotYetValid
        );
        assert_eq!(
            book.validate("GONE", &Money::usd(600), now).unwrap_err(),
            CouponRejection::UsageLimitReached
        );
        let below = book.validate("SAVE10", &Money::usd(40), now).unwrap_err();
        assert_eq!(below.reason(), "below-minimum-amount");
        assert_eq!(below.to_string(), "Minimum order amount of $50.00 required");
    }

    #[test]
    fn test_not_yet_valid() {
        let rejection = book().validate("SAVE10", &Money::usd(600), at(2025, 12, 31)).unwrap_err();
        assert_eq!(rejection.reason(), "expired-or-not-yet-valid");
    }

    #[test]
    fn test_window_is_inclusive() {
        let coupon = save10();
        assert!(coupon.is_active_at(coupon.valid_from));
        assert!(coupon.is_active_at(coupon.valid_to));
    }

    #[test]
    fn test_window_checked_before_minimum() {
        // Expired and below minimum: the window check comes first.
        let mut expired = save10();
        expired.valid_to = at(2026, 1, 2);
        let book = CouponBook::new(vec![expired]);
        assert_eq!(
            book.validate("SAVE10", &Money::usd(10), at(2026, 6, 1)).unwrap_err(),
            CouponRejection::ExpiredOrNotYetValid
        );
    }

    #[test]
    fn test_coupon_json_shape() {
        let json = serde_json::to_value(save10()).unwrap();
        assert_eq!(json["value"]["type"], "percentage");
        assert_eq!(json["usageLimit"], 1000);

        let rejection = serde_json::to_value(CouponRejection::UsageLimitReached).unwrap();
        assert_eq!(rejection["reason"], "usage-limit-reached");
    }
}
