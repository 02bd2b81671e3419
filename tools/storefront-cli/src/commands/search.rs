//! Catalog search.

use anyhow::Result;
use serde::Serialize;
use storefront_commerce::catalog::Product;
use storefront_commerce::search::{filter_products, parse_query, ProductQuery, RawParams};

use super::SearchArgs;
use crate::context::Context;
use crate::output::{price_label, stock_badge, truncate};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchReport<'a> {
    query: &'a ProductQuery,
    active_filters: usize,
    total: usize,
    products: Vec<&'a Product>,
}

/// Run the search command.
pub fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let query = parse_query(&RawParams::from_query_string(&args.query));
    let results = filter_products(&catalog.products, &query);
    let limit = args.limit.unwrap_or(ctx.config.search.default_limit);

    ctx.output.debug(&format!(
        "{} active filter(s), sorted by {}",
        query.active_filter_count(),
        query.sort_by.as_str()
    ));

    if ctx.output.is_json() {
        ctx.output.json(&SearchReport {
            query: &query,
            active_filters: query.active_filter_count(),
            total: results.len(),
            products: results.iter().take(limit).copied().collect(),
        });
        return Ok(());
    }

    ctx.output.header(&format!(
        "{} product(s) · {}",
        results.len(),
        query.sort_by.display_name()
    ));

    if results.is_empty() {
        ctx.output.info("No products match these filters");
        return Ok(());
    }

    let widths = [8, 24, 10, 10, 8];
    ctx.output
        .table_row(&["ID", "NAME", "BRAND", "MATERIAL", "PRICE"], &widths);
    for product in results.iter().take(limit) {
        let name = truncate(&product.name, widths[1]);
        let price = price_label(&product.price, product.original_price.as_ref());
        let stock = stock_badge(product.in_stock);
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &name,
                &product.brand,
                &product.material,
                &format!("{}  {}", price, stock),
            ],
            &widths,
        );
    }

    if results.len() > limit {
        ctx.output
            .info(&format!("{} more not shown (use --limit)", results.len() - limit));
    }

    Ok(())
}
