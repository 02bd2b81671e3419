//! Category types for product organization.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A top-level category (e.g., "Men") with its sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL-friendly slug, matched against `Product::category`.
    pub slug: String,
    /// Category image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Sub-categories, in display order.
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

/// A sub-category. Slugs are only unique within their parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub category_id: CategoryId,
}

impl Category {
    /// Create a category without sub-categories.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            image: None,
            sub_categories: Vec::new(),
        }
    }

    /// Add a sub-category, linking it to this category.
    pub fn with_sub_category(
        mut self,
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        self.sub_categories.push(SubCategory {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            category_id: self.id.clone(),
        });
        self
    }

    /// Look up a sub-category by slug.
    pub fn sub_category(&self, slug: &str) -> Option<&SubCategory> {
        self.sub_categories.iter().find(|s| s.slug == slug)
    }
}
