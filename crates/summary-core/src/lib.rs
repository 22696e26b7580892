//! # summary-core
//!
//! Itemized monetary summaries for carts and orders.
//!
//! This crate provides:
//! - `Extra` and `ExtraRegistry` for declaring named adjustment lines
//!   (tax, discount, delivery, commission) as literals or instance resolvers
//! - `ItemsAdapter` and `VoucherAdapter` for reading line items and
//!   percent-off vouchers from a cart-like record
//! - `SummaryDefinition` and `Summary` for lazily resolved, per-instance
//!   cached totals
//! - `SummaryConfig` for declaring extras and policy in TOML
//! - overflow-checked money arithmetic and input limits (`money`)
//! - `SummaryError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use summary_core::{Cart, Extra, ExtraRegistry, Field, Product, SummaryDefinition};
//! use rust_decimal::Decimal;
//!
//! let registry = ExtraRegistry::builder()
//!     .extra(Extra::new("tax").verbose_name("GST").amount(Decimal::new(1003, 2)).included(true))
//!     .extra(Extra::new("delivery").amount(Field::from_fn(|cart: &Cart| {
//!         if cart.item_count() > 10 { Decimal::ZERO } else { Decimal::new(1001, 2) }
//!     })))
//!     .build()?;
//!
//! let definition = SummaryDefinition::cart_builder("cart").registry(registry).build()?;
//!
//! let mut cart = Cart::new(1);
//! cart.add_product(Product::new("atlas", "Atlas", Decimal::new(1122, 2)), 1);
//!
//! let summary = definition.summarize(&cart);
//! println!("{} (pre-tax {})", summary.total()?, summary.items_pretax()?);
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod extra;
pub mod field;
pub mod items;
pub mod money;
pub mod policy;
pub mod registry;
pub mod summary;
pub mod voucher;

// Re-exports for convenience
pub use cart::{Cart, CartItem, CartLike, Order, Product, Voucher};
pub use config::{ExtraConfig, SummaryConfig};
pub use error::{BoxError, SummaryError, SummaryResult};
pub use extra::{Extra, ResolvedExtra};
pub use field::{humanize, Field, IntoField, ResolverFn};
pub use items::{BoxedItemsAdapter, CartItemsAdapter, ItemsAdapter, ResolvedItem};
pub use money::{MAX_PERCENT, MAX_PRICE, MAX_QUANTITY};
pub use policy::{RoundingMode, SummaryPolicy};
pub use registry::{ExtraRegistry, ExtraRegistryBuilder};
pub use summary::{
    ComputedFn, ComputedValue, RenderedSummary, Summary, SummaryDefinition,
    SummaryDefinitionBuilder,
};
pub use voucher::{BoxedVoucherAdapter, PercentVoucherAdapter, VoucherAdapter};
