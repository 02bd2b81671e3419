//! Product detail with variant-resolved pricing.

use anyhow::Result;
use serde::Serialize;
use storefront_commerce::catalog::{PriceRange, Product};
use storefront_commerce::ids::ProductId;
use storefront_commerce::money::Money;

use super::ProductArgs;
use crate::context::Context;
use crate::output::{price_label, stock_badge};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductView<'a> {
    product: &'a Product,
    color: Option<&'a str>,
    size: Option<&'a str>,
    price: Money,
    original_price: Option<Money>,
    in_stock: bool,
    price_range: PriceRange,
}

/// Run the product command.
pub fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let product = catalog.product(&ProductId::new(args.id.as_str()))?;

    let color = args.color.as_deref();
    let size = args.size.as_deref();
    let view = ProductView {
        product,
        color,
        size,
        price: product.variant_price(color, size),
        original_price: product.variant_original_price(color, size),
        in_stock: product.is_variant_in_stock(color, size),
        price_range: product.price_range(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&view);
        return Ok(());
    }

    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    ctx.output.kv(
        "category",
        &format!("{} / {}", product.category, product.sub_category),
    );
    ctx.output.kv("brand", &product.brand);
    ctx.output.kv("material", &product.material);
    ctx.output.kv(
        "price",
        &price_label(&view.price, view.original_price.as_ref()),
    );
    ctx.output.kv("stock", &stock_badge(view.in_stock));
    if !view.price_range.is_single() {
        ctx.output.kv(
            "range",
            &format!("{} - {}", view.price_range.min, view.price_range.max),
        );
    }
    ctx.output.kv("colors", &product.colors.join(", "));
    ctx.output.kv("sizes", &product.sizes.join(", "));

    if product.has_variants() {
        ctx.output.info("Variants:");
        for variant in &product.variants {
            ctx.output.list_item(&format!(
                "{} / {}  {}  {}",
                variant.color,
                variant.size,
                price_label(&variant.price, variant.original_price.as_ref()),
                stock_badge(variant.in_stock)
            ));
        }
    }

    Ok(())
}
