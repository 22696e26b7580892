//! # Items Adapter
//!
//! Extracts priced line items from an instance. The adapter is the seam
//! between whatever shape the instance has and the summary engine:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            ItemsAdapter<I> (trait)          │
//! │  └── items(&I) -> Vec<ResolvedItem>         │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!   ┌──────┴───────┐        ┌──────┴───────┐
//!   │CartItems     │        │ custom       │
//!   │Adapter       │        │ adapters     │
//!   └──────────────┘        └──────────────┘
//! ```

use crate::cart::CartLike;
use crate::error::{BoxError, SummaryResult};
use crate::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A line item with its computed total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    /// Id of the source item
    pub item_id: u64,

    /// Product identifier
    pub product_ref: String,

    /// Product name (for display)
    #[serde(default)]
    pub name: String,

    /// Unit price
    pub unit_price: Decimal,

    /// Quantity
    pub quantity: u32,

    /// `unit_price * quantity`
    pub line_total: Decimal,
}

impl ResolvedItem {
    /// Create an item, computing its line total
    pub fn new(
        item_id: u64,
        product_ref: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> SummaryResult<Self> {
        let line_total = money::line_total(unit_price, quantity)
            .ok_or_else(|| money::overflow(format!("item {}.line_total", item_id)))?;
        Ok(Self {
            item_id,
            product_ref: product_ref.into(),
            name: String::new(),
            unit_price,
            quantity,
            line_total,
        })
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Produces the ordered line items of an instance.
///
/// Implementations keep the instance's natural order and return an empty
/// list when the instance has no item collection. Errors (an overflowing
/// line total, a failed lookup) propagate to the caller.
pub trait ItemsAdapter<I>: Send + Sync {
    fn items(&self, instance: &I) -> Result<Vec<ResolvedItem>, BoxError>;
}

/// Type alias for a shared items adapter (dynamic dispatch)
pub type BoxedItemsAdapter<I> = Arc<dyn ItemsAdapter<I>>;

/// Items adapter for any [`CartLike`] record
#[derive(Debug, Clone, Copy, Default)]
pub struct CartItemsAdapter;

impl<I: CartLike> ItemsAdapter<I> for CartItemsAdapter {
    fn items(&self, instance: &I) -> Result<Vec<ResolvedItem>, BoxError> {
        instance
            .line_items()
            .unwrap_or_default()
            .iter()
            .map(|item| -> Result<ResolvedItem, BoxError> {
                let resolved =
                    ResolvedItem::new(item.id, &item.product.id, item.product.price, item.quantity)?;
                Ok(resolved.with_name(&item.product.name))
            })
            .collect()
    }
}

/// Sum of line totals
pub fn items_total(items: &[ResolvedItem]) -> SummaryResult<Decimal> {
    money::checked_sum(items.iter().map(|item| item.line_total))
        .ok_or_else(|| money::overflow("items_total"))
}
