//! Coupon listing and checking.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_commerce::cart::{AppliedCoupon, Coupon, CouponRejection, CouponValue};
use storefront_commerce::money::Money;

use super::{CouponsArgs, CouponsCommand};
use crate::context::Context;

/// Run the coupons command.
pub fn run(args: CouponsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CouponsCommand::List => list_coupons(ctx),
        CouponsCommand::Check { code, subtotal, at } => {
            check_coupon(&code, subtotal, at.as_deref(), ctx)
        }
    }
}

fn list_coupons(ctx: &Context) -> Result<()> {
    let book = ctx.catalog()?.coupon_book();

    if ctx.output.is_json() {
        ctx.output.json(&book);
        return Ok(());
    }

    ctx.output.header(&format!("{} coupon(s)", book.len()));
    let now = Utc::now();
    let widths = [10, 22, 10, 12, 10];
    ctx.output
        .table_row(&["CODE", "VALUE", "MINIMUM", "USES", "STATUS"], &widths);
    for coupon in book.iter() {
        let minimum = coupon
            .min_amount
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                &coupon.code,
                &describe_value(&coupon.value),
                &minimum,
                &usage(coupon),
                status(coupon, now),
            ],
            &widths,
        );
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    code: &'a str,
    subtotal: Money,
    checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<AppliedCoupon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<CouponRejection>,
}

fn check_coupon(code: &str, subtotal: f64, at: Option<&str>, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let now = match at {
        Some(raw) => parse_time(raw)?,
        None => Utc::now(),
    };
    let subtotal = Money::from_decimal(subtotal, catalog.currency().unwrap_or_default());
    let outcome = catalog.coupon_book().apply(code, &subtotal, now);

    if ctx.output.is_json() {
        let (applied, rejection) = match outcome {
            Ok(applied) => (Some(applied), None),
            Err(rejection) => (None, Some(rejection)),
        };
        ctx.output.json(&CheckReport {
            code,
            subtotal,
            checked_at: now,
            applied,
            rejection,
        });
        return Ok(());
    }

    // A rejection is an answer, not a failure.
    match outcome {
        Ok(applied) => {
            ctx.output.success(&format!(
                "{} applies: {} off {}",
                applied.coupon.code, applied.discount_amount, subtotal
            ));
            ctx.output.kv("final price", &applied.final_price.to_string());
        }
        Err(rejection) => {
            ctx.output.warn(&rejection.to_string());
            ctx.output.kv("reason", rejection.reason());
        }
    }

    Ok(())
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid --at time (expected RFC 3339): {}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

fn describe_value(value: &CouponValue) -> String {
    match value {
        CouponValue::Percentage {
            percent,
            max_discount: Some(cap),
        } => format!("{}% (max {})", percent, cap),
        CouponValue::Percentage { percent, .. } => format!("{}%", percent),
        CouponValue::Fixed { amount } => format!("{} off", amount),
    }
}

fn usage(coupon: &Coupon) -> String {
    match coupon.usage_limit {
        Some(limit) => format!("{}/{}", coupon.used_count, limit),
        None => coupon.used_count.to_string(),
    }
}

fn status(coupon: &Coupon, now: DateTime<Utc>) -> &'static str {
    if !coupon.is_active_at(now) {
        "inactive"
    } else if coupon.is_exhausted() {
        "used up"
    } else {
        "active"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_value() {
        let capped = CouponValue::Percentage {
            percent: 10.0,
            max_discount: Some(Money::usd(100)),
        };
        assert_eq!(describe_value(&capped), "10% (max $100.00)");
        assert_eq!(
            describe_value(&CouponValue::Fixed {
                amount: Money::usd(15)
            }),
            "$15.00 off"
        );
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2026-06-01T12:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-06-01T10:00:00+00:00");
        assert!(parse_time("yesterday").is_err());
    }
}
