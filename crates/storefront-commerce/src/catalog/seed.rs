//! Built-in demo data: the catalog the storefront ships with when no
//! catalog file is configured.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::cart::{Coupon, CouponValue};
use crate::catalog::{Catalog, Category, Product, ProductVariant};
use crate::money::Money;

const PRODUCT_COUNT: usize = 24;
const NAMES: [&str; 8] = [
    "Linen Shirt",
    "Cotton Tee",
    "Denim Jacket",
    "Chino Pants",
    "Summer Dress",
    "Casual Blazer",
    "Knit Sweater",
    "Silk Blouse",
];
const BRANDS: [&str; 4] = ["Lastore", "Essential", "Form", "Arc"];
const MATERIALS: [&str; 4] = ["Cotton", "Linen", "Denim", "Wool"];
const COLORS: [&str; 4] = ["black", "white", "navy", "beige"];
const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

/// (color, size, price offset in dollars, in stock)
const VARIANT_TABLE: [(&str, &str, i64, bool); 9] = [
    ("black", "S", 5, true),
    ("black", "M", 3, true),
    ("black", "L", 7, false),
    ("white", "S", 2, true),
    ("white", "M", 0, true),
    ("white", "L", 4, true),
    ("navy", "S", 6, true),
    ("navy", "M", 1, true),
    ("navy", "L", 8, false),
];

/// The demo catalog: 4 categories, 24 products, 3 coupons.
pub fn demo_catalog() -> Catalog {
    let categories = demo_categories();
    let products = (0..PRODUCT_COUNT)
        .map(|idx| demo_product(idx, &categories))
        .collect();

    Catalog {
        products,
        categories,
        coupons: demo_coupons(),
    }
}

/// The demo categories with their sub-categories.
pub fn demo_categories() -> Vec<Category> {
    vec![
        Category::new("cat-men", "Men", "men")
            .with_sub_category("sub-men-tops", "Tops", "tops")
            .with_sub_category("sub-men-bottoms", "Bottoms", "bottoms")
            .with_sub_category("sub-men-outerwear", "Outerwear", "outerwear"),
        Category::new("cat-women", "Women", "women")
            .with_sub_category("sub-women-tops", "Tops", "tops")
            .with_sub_category("sub-women-dresses", "Dresses", "dresses")
            .with_sub_category("sub-women-outerwear", "Outerwear", "outerwear"),
        Category::new("cat-kids", "Kids", "kids")
            .with_sub_category("sub-kids-tops", "Tops", "tops")
            .with_sub_category("sub-kids-bottoms", "Bottoms", "bottoms"),
        Category::new("cat-accessories", "Accessories", "accessories")
            .with_sub_category("sub-acc-bags", "Bags", "bags")
            .with_sub_category("sub-acc-hats", "Hats", "hats"),
    ]
}

/// The demo coupons: SAVE10, FREESHIP and WELCOME20.
pub fn demo_coupons() -> Vec<Coupon> {
    let from = utc(2026, 1, 1);
    let to = utc(2027, 12, 31);

    vec![
        Coupon::new(
            "SAVE10",
            CouponValue::Percentage {
                percent: 10.0,
                max_discount: Some(Money::usd(100)),
            },
            from,
            to,
        )
        .with_min_amount(Money::usd(50))
        .with_usage(1000, 500)
        .with_description("Save 10% on orders over $50"),
        Coupon::new("FREESHIP", CouponValue::Fixed { amount: Money::usd(15) }, from, to)
            .with_min_amount(Money::usd(100))
            .with_usage(500, 200)
            .with_description("Free shipping on orders over $100"),
        Coupon::new(
            "WELCOME20",
            CouponValue::Percentage {
                percent: 20.0,
                max_discount: Some(Money::usd(50)),
            },
            from,
            to,
        )
        .with_min_amount(Money::usd(30))
        .with_usage(200, 50)
        .with_description("Welcome discount - 20% off"),
    ]
}

fn demo_product(idx: usize, categories: &[Category]) -> Product {
    let category = &categories[idx % categories.len()];
    let sub = &category.sub_categories[idx % category.sub_categories.len()];
    let clearance = idx % 6 == 0;
    let dollars = 29 + (idx as i64 % 8) * 10;
    let price = Money::usd(dollars);
    let original_price = clearance.then(|| Money::usd(dollars + 20));

    let mut product = Product::new(
        format!("prod-{}", idx + 1),
        format!("{} {}", NAMES[idx % NAMES.len()], idx + 1),
        price,
        created_at(idx),
    );
    product.description = "Breathable fabric with minimal silhouette for daily comfort.".to_string();
    product.original_price = original_price;
    product.images = vec![format!("/product-images/prod-{}.jpg", idx + 1)];
    product.category = category.slug.clone();
    product.sub_category = sub.slug.clone();
    product.brand = BRANDS[idx % BRANDS.len()].to_string();
    product.material = MATERIALS[idx % MATERIALS.len()].to_string();
    product.colors = COLORS[..(idx % 4) + 1].iter().map(|c| c.to_string()).collect();
    product.sizes = SIZES[..3 + (idx % 3)].iter().map(|s| s.to_string()).collect();
    product.rating = 3.0 + (idx % 3) as f32;
    product.reviews = 10 + idx as u32 * 2;
    product.in_stock = idx % 7 != 0;
    product.featured = idx % 5 == 0;
    product.new_arrival = idx % 4 == 0;
    product.clearance = clearance;
    product.tags = vec![category.slug.clone(), sub.slug.clone()];

    if idx % 3 == 0 {
        product.variants = VARIANT_TABLE
            .iter()
            .map(|&(color, size, offset, in_stock)| ProductVariant {
                color: color.to_string(),
                size: size.to_string(),
                price: Money::usd(dollars + offset),
                original_price: original_price.map(|op| Money::usd(op.amount_cents / 100 + offset)),
                in_stock,
            })
            .collect();
    }

    product
}

/// Later products are newer, one day apart.
fn created_at(idx: usize) -> DateTime<Utc> {
    utc(2025, 1, 1) + Duration::days(idx as i64)
}

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
