//! Replay a cart script through a `CartStore`.
//!
//! A script is a list of steps, for example in TOML:
//!
//! ```toml
//! [[steps]]
//! action = "add"
//! product_id = "prod-1"
//! quantity = 2
//! color = "black"
//! size = "M"
//!
//! [[steps]]
//! action = "apply_coupon"
//! code = "SAVE10"
//!
//! [[steps]]
//! action = "checkout"
//! ```

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use storefront_commerce::cart::{
    CartNotice, CartState, CartStore, CartTotals, OrderSummary, VariantKey,
};
use storefront_commerce::catalog::Catalog;
use storefront_commerce::ids::ProductId;

use super::CartArgs;
use crate::config::is_json;
use crate::context::Context;

/// One scripted cart interaction.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartStep {
    Add {
        product_id: String,
        #[serde(default = "default_quantity")]
        quantity: i64,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        size: Option<String>,
    },
    Remove {
        product_id: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        size: Option<String>,
    },
    Clear,
    ApplyCoupon {
        code: String,
    },
    RemoveCoupon,
    Checkout,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CartScript {
    pub steps: Vec<CartStep>,
}

impl CartScript {
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            serde_json::from_str(content).context("Failed to parse JSON cart script")
        } else {
            toml::from_str(content).context("Failed to parse TOML cart script")
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReport {
    pub notices: Vec<CartNotice>,
    pub orders: Vec<OrderSummary>,
    pub cart: CartState,
    pub totals: Option<CartTotals>,
}

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.script);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read cart script: {}", path.display()))?;
    let script = CartScript::parse(&content, is_json(&path))
        .with_context(|| format!("Invalid cart script: {}", path.display()))?;
    let catalog = ctx.catalog()?;

    let report = replay(&script, &catalog, CartStore::new(catalog.coupon_book()), ctx)?;

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    if report.cart.is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    let widths = [32, 5, 10, 10];
    ctx.output.table_row(&["ITEM", "QTY", "PRICE", "TOTAL"], &widths);
    for item in &report.cart.items {
        let total = item.line_total()?;
        ctx.output.table_row(
            &[
                &item.key.to_string(),
                &item.quantity.to_string(),
                &item.variant_price.to_string(),
                &total.to_string(),
            ],
            &widths,
        );
    }
    if let Some(totals) = &report.totals {
        print_totals(ctx, totals);
    }

    Ok(())
}

/// Apply every step in order. A failing step stops the replay.
pub fn replay(
    script: &CartScript,
    catalog: &Catalog,
    mut store: CartStore,
    ctx: &Context,
) -> Result<CartReport> {
    let mut report = CartReport::default();

    for (idx, step) in script.steps.iter().enumerate() {
        let step_no = idx + 1;
        ctx.output.debug(&format!("step {}: {:?}", step_no, step));
        tracing::debug!(step = step_no, ?step, "replaying cart step");

        let notice = match step {
            CartStep::Add {
                product_id,
                quantity,
                color,
                size,
            } => {
                let product = catalog
                    .product(&ProductId::new(product_id.as_str()))
                    .with_context(|| format!("step {}", step_no))?;
                store
                    .add(product.clone(), *quantity, color.as_deref(), size.as_deref())
                    .with_context(|| format!("step {}", step_no))?
            }
            CartStep::Remove {
                product_id,
                color,
                size,
            } => {
                let key = VariantKey::new(
                    &ProductId::new(product_id.as_str()),
                    color.as_deref(),
                    size.as_deref(),
                );
                store.remove(&key)?
            }
            CartStep::Clear => store.clear()?,
            CartStep::ApplyCoupon { code } => store.apply_coupon(code)?,
            CartStep::RemoveCoupon => store.remove_coupon()?,
            CartStep::Checkout => {
                let order = store
                    .place_order()
                    .with_context(|| format!("step {}", step_no))?;
                ctx.output.success(&format!(
                    "Order placed: {} line(s), {} item(s), total {}",
                    order.lines.len(),
                    order.totals.total_quantity,
                    order.totals.final_price
                ));
                report.orders.push(order);
                None
            }
        };

        if let Some(notice) = notice {
            ctx.output.notice(&notice);
            report.notices.push(notice);
        }
    }

    tracing::info!(
        steps = script.steps.len(),
        orders = report.orders.len(),
        notices = report.notices.len(),
        "cart script replayed"
    );
    report.totals = Some(store.totals()?);
    report.cart = store.state().clone();
    Ok(report)
}

fn print_totals(ctx: &Context, totals: &CartTotals) {
    ctx.output.kv("items", &totals.total_quantity.to_string());
    ctx.output.kv("subtotal", &totals.subtotal.to_string());
    if totals.has_discount() {
        ctx.output.kv("discount", &discount_label(totals));
    }
    ctx.output.kv("total", &totals.final_price.to_string());
}

fn discount_label(totals: &CartTotals) -> String {
    format!(
        "-{} ({:.0}%)",
        totals.discount_amount,
        totals.discount_percentage()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::output::Output;
    use chrono::{DateTime, TimeZone, Utc};
    use storefront_commerce::catalog::seed::demo_catalog;
    use storefront_commerce::money::Money;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn quiet_context() -> Context {
        Context {
            config: StorefrontConfig::default(),
            config_path: None,
            output: Output::new(false, true),
            cwd: std::env::temp_dir(),
        }
    }

    fn run_script(toml_script: &str) -> Result<CartReport> {
        let catalog = demo_catalog();
        let script = CartScript::parse(toml_script, false)?;
        let store = CartStore::new(catalog.coupon_book()).with_clock(fixed_now);
        replay(&script, &catalog, store, &quiet_context())
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_replay_emits_tracing_events() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            run_script(
                r#"
                [[steps]]
                action = "add"
                product_id = "prod-2"
                "#,
            )
        })
        .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("replaying cart step"));
        assert!(output.contains("cart script replayed"));
    }

    #[test]
    fn test_parse_json_script() {
        let script = CartScript::parse(
            r#"{"steps": [{"action": "add", "product_id": "prod-2"}, {"action": "clear"}]}"#,
            true,
        )
        .unwrap();
        assert_eq!(
            script.steps[0],
            CartStep::Add {
                product_id: "prod-2".to_string(),
                quantity: 1,
                color: None,
                size: None,
            }
        );
        assert_eq!(script.steps[1], CartStep::Clear);
    }

    #[test]
    fn test_replay_variants_and_coupon() {
        let report = run_script(
            r#"
            [[steps]]
            action = "add"
            product_id = "prod-1"
            quantity = 2
            color = "black"
            size = "M"

            [[steps]]
            action = "add"
            product_id = "prod-1"
            color = "white"
            size = "M"

            [[steps]]
            action = "apply_coupon"
            code = "welcome20"
            "#,
        )
        .unwrap();

        assert_eq!(report.cart.items.len(), 2);
        assert_eq!(report.notices.len(), 3);
        // prod-1 costs $29; black/M is +$3, white/M is +$0.
        let totals = report.totals.unwrap();
        assert_eq!(totals.subtotal, Money::usd(2 * 32 + 29));
        assert!(totals.has_discount());
    }

    #[test]
    fn test_replay_checkout_empties_cart() {
        let report = run_script(
            r#"
            [[steps]]
            action = "add"
            product_id = "prod-3"

            [[steps]]
            action = "checkout"
            "#,
        )
        .unwrap();

        assert_eq!(report.orders.len(), 1);
        assert!(report.cart.is_empty());
        assert_eq!(report.totals.unwrap().total_quantity, 0);
    }

    #[test]
    fn test_replay_unknown_product_names_step() {
        let err = run_script(
            r#"
            [[steps]]
            action = "add"
            product_id = "prod-999"
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("step 1"));
    }

    #[test]
    fn test_rejected_coupon_is_reported_not_fatal() {
        let report = run_script(
            r#"
            [[steps]]
            action = "add"
            product_id = "prod-2"

            [[steps]]
            action = "apply_coupon"
            code = "FREESHIP"
            "#,
        )
        .unwrap();

        assert!(matches!(
            report.notices.last(),
            Some(CartNotice::CouponRejected { .. })
        ));
        assert!(report.cart.coupon_error.is_some());
    }
}
