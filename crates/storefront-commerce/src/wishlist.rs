//! Saved products, at most one entry per product id.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::ids::ProductId;

/// An action the wishlist reducer understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WishlistAction {
    Add { product: Box<Product> },
    Remove { product_id: ProductId },
    Clear,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WishlistState {
    pub items: Vec<Product>,
}

impl WishlistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the next state. Adding a saved product or removing an unsaved
    /// one returns an equal state.
    pub fn reduce(&self, action: WishlistAction) -> WishlistState {
        match action {
            WishlistAction::Add { product } => {
                if self.contains(&product.id) {
                    return self.clone();
                }
                tracing::debug!(product = %product.id, "wishlist add");
                let mut next = self.clone();
                next.items.push(*product);
                next
            }
            WishlistAction::Remove { product_id } => WishlistState {
                items: self
                    .items
                    .iter()
                    .filter(|p| p.id != product_id)
                    .cloned()
                    .collect(),
            },
            WishlistAction::Clear => WishlistState::default(),
        }
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
