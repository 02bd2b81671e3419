//! Structured product queries and their parsing from raw parameters.

use crate::search::params::encode_component;
use crate::search::{Filter, ParamValue, RawParams};
use serde::{Deserialize, Serialize};

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Newest first (by creation time).
    #[default]
    Newest,
    /// Most reviewed first.
    TopSells,
    /// Price, low to high.
    PriceLowHigh,
    /// Price, high to low.
    PriceHighLow,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::TopSells => "top-sells",
            SortOption::PriceLowHigh => "price-low-high",
            SortOption::PriceHighLow => "price-high-low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortOption::Newest),
            "top-sells" => Some(SortOption::TopSells),
            "price-low-high" => Some(SortOption::PriceLowHigh),
            "price-high-low" => Some(SortOption::PriceHighLow),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Newest => "Newest",
            SortOption::TopSells => "Top Sells",
            SortOption::PriceLowHigh => "Price: Low to High",
            SortOption::PriceHighLow => "Price: High to Low",
        }
    }
}

/// A product query: optional filters plus a sort order.
///
/// A `None` field places no constraint on the result. Empty lists and a
/// blank search term are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub brand: Option<Vec<String>>,
    pub material: Option<Vec<String>>,
    pub color: Option<Vec<String>>,
    pub size: Option<Vec<String>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort_by: SortOption,
}

impl ProductQuery {
    /// Create an unconstrained query sorted by newest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to a category slug.
    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Restrict to a sub-category slug.
    pub fn with_sub_category(mut self, slug: impl Into<String>) -> Self {
        self.sub_category = Some(slug.into());
        self
    }

    /// Restrict to any of the given brands.
    pub fn with_brands<S: Into<String>>(mut self, brands: impl IntoIterator<Item = S>) -> Self {
        self.brand = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to any of the given materials.
    pub fn with_materials<S: Into<String>>(mut self, materials: impl IntoIterator<Item = S>) -> Self {
        self.material = Some(materials.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to products offered in any of the given colors.
    pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.color = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to products offered in any of the given sizes.
    pub fn with_sizes<S: Into<String>>(mut self, sizes: impl IntoIterator<Item = S>) -> Self {
        self.size = Some(sizes.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the base price to an inclusive range.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort_by = sort;
        self
    }

    /// The active filters of this query, one per constrained field.
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();

        if let Some(term) = self.search.as_deref().filter(|t| !t.trim().is_empty()) {
            filters.push(Filter::text(term));
        }
        if let Some(category) = non_empty(&self.category) {
            filters.push(Filter::Category(category.to_string()));
        }
        if let Some(sub) = non_empty(&self.sub_category) {
            filters.push(Filter::SubCategory(sub.to_string()));
        }
        if let Some(brands) = non_empty_list(&self.brand) {
            filters.push(Filter::Brands(brands.to_vec()));
        }
        if let Some(materials) = non_empty_list(&self.material) {
            filters.push(Filter::Materials(materials.to_vec()));
        }
        if let Some(colors) = non_empty_list(&self.color) {
            filters.push(Filter::Colors(colors.to_vec()));
        }
        if let Some(sizes) = non_empty_list(&self.size) {
            filters.push(Filter::Sizes(sizes.to_vec()));
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            filters.push(Filter::price_range(self.min_price, self.max_price));
        }

        filters
    }

    /// Number of active filter selections, as shown on the filter badge.
    ///
    /// Each selected brand, material, color and size counts once; category,
    /// sub-category and the price range count one each.
    pub fn active_filter_count(&self) -> usize {
        let selections = [&self.brand, &self.material, &self.color, &self.size]
            .into_iter()
            .map(|list| list.as_ref().map_or(0, |values| values.iter().filter(|v| !v.is_empty()).count()))
            .sum::<usize>();

        selections
            + usize::from(non_empty(&self.category).is_some())
            + usize::from(non_empty(&self.sub_category).is_some())
            + usize::from(self.min_price.is_some() || self.max_price.is_some())
    }

    /// Serialize back to a URL query string that [`parse_query`] reads
    /// into an equivalent query.
    ///
    /// List values are comma-joined, so a single value containing a comma
    /// is split on the way back.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(sub) = &self.sub_category {
            pairs.push(("subCategory", sub.clone()));
        }
        for (key, list) in [
            ("brand", &self.brand),
            ("material", &self.material),
            ("color", &self.color),
            ("size", &self.size),
        ] {
            if let Some(values) = non_empty_list(list) {
                pairs.push((key, values.join(",")));
            }
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", format_number(min)));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", format_number(max)));
        }
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Normalize raw parameters into a [`ProductQuery`].
///
/// Never fails: malformed values degrade to "no constraint" and an unknown
/// sort falls back to [`SortOption::Newest`].
pub fn parse_query(params: &RawParams) -> ProductQuery {
    let single = |key: &str| params.get(key).and_then(ParamValue::as_single).map(str::to_string);

    ProductQuery {
        search: single("search"),
        category: single("category"),
        sub_category: single("subCategory"),
        brand: to_list(params.get("brand")),
        material: to_list(params.get("material")),
        color: to_list(params.get("color")),
        size: to_list(params.get("size")),
        min_price: to_number(params.get("minPrice")),
        max_price: to_number(params.get("maxPrice")),
        sort_by: params
            .get("sortBy")
            .and_then(ParamValue::as_single)
            .and_then(SortOption::from_str)
            .unwrap_or_default(),
    }
}

fn to_list(value: Option<&ParamValue>) -> Option<Vec<String>> {
    match value? {
        ParamValue::Many(values) => Some(values.clone()),
        ParamValue::One(raw) if raw.is_empty() => None,
        ParamValue::One(raw) => Some(
            raw.split(',')
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

fn to_number(value: Option<&ParamValue>) -> Option<f64> {
    value?.first().and_then(parse_leading_float)
}

/// Parse the longest numeric prefix, ignoring leading whitespace and any
/// trailing garbage ("30usd" reads as 30). No numeric prefix or NaN is `None`.
fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let is_digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let mut end = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().ok();
    }

    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let mut frac_end = end + 1;
        while is_digit(frac_end) {
            frac_end += 1;
        }
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while is_digit(exp_end) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn format_number(value: f64) -> String {
    match value {
        v if v == f64::INFINITY => "Infinity".to_string(),
        v if v == f64::NEG_INFINITY => "-Infinity".to_string(),
        v => v.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|v| !v.is_empty())
}
