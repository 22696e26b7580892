//! # Summary Engine
//!
//! A [`SummaryDefinition`] is the reusable "summary type": an extra
//! registry, the adapters that read items and vouchers, the rounding policy,
//! and any custom computed values. Binding it to one instance gives a
//! [`Summary`], which resolves everything lazily and caches each value for
//! its own lifetime.
//!
//! ```text
//!  instance ──► ItemsAdapter ──► items ──► items_total ─┬──► total
//!     │                                                 │
//!     ├──────► ExtraRegistry ──► extras ─┬─ included ───┴──► items_pretax
//!     │                                  └─ others ──┐
//!     └──────► VoucherAdapter ─► vouchers ───────────┴─► extras_total
//! ```
//!
//! Formulas (exact, overflow-checked decimal arithmetic):
//! - `items_total = Σ line_total`
//! - `items_pretax = items_total - Σ included extras`
//! - `extras_total = Σ non-included extras + vouchers_total`
//! - `total = items_total + extras_total`
//! - `total_prevent_negative = max(total, 0)`
//!
//! Aggregates are never rounded on their own, so they always add up to the
//! lines reported next to them. The policy rounds the lines it synthesizes
//! (voucher discounts, percentage extras from configuration).

use crate::cart::CartLike;
use crate::error::{BoxError, SummaryError, SummaryResult};
use crate::extra::ResolvedExtra;
use crate::items::{self, BoxedItemsAdapter, CartItemsAdapter, ItemsAdapter, ResolvedItem};
use crate::money;
use crate::policy::SummaryPolicy;
use crate::registry::ExtraRegistry;
use crate::voucher::{self, BoxedVoucherAdapter, PercentVoucherAdapter, VoucherAdapter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, OnceCell};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Custom value computed from a summary and its instance
pub type ComputedFn<I> =
    Arc<dyn Fn(&Summary<'_, I>, &I) -> Result<Decimal, BoxError> + Send + Sync>;

/// Reusable summary type: extras, adapters, policy and custom values
pub struct SummaryDefinition<I> {
    name: String,
    registry: ExtraRegistry<I>,
    items: BoxedItemsAdapter<I>,
    vouchers: Option<BoxedVoucherAdapter<I>>,
    policy: SummaryPolicy,
    computed: Vec<(String, ComputedFn<I>)>,
}

impl<I> SummaryDefinition<I> {
    /// Start a definition; an items adapter must be supplied before `build`
    pub fn builder(name: impl Into<String>) -> SummaryDefinitionBuilder<I> {
        SummaryDefinitionBuilder {
            name: name.into(),
            registry: ExtraRegistry::empty(),
            items: None,
            vouchers: None,
            policy: SummaryPolicy::default(),
            computed: Vec::new(),
        }
    }

    /// Bind to an instance
    pub fn summarize<'a>(&'a self, instance: &'a I) -> Summary<'a, I> {
        Summary::new(self, instance)
    }

    /// Definition name (for logging)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The extra registry
    pub fn registry(&self) -> &ExtraRegistry<I> {
        &self.registry
    }

    /// Rounding policy
    pub fn policy(&self) -> &SummaryPolicy {
        &self.policy
    }

    /// Names of custom computed values in declaration order
    pub fn computed_names(&self) -> Vec<&str> {
        self.computed.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Check if vouchers are summarized
    pub fn has_vouchers(&self) -> bool {
        self.vouchers.is_some()
    }
}

impl<I: CartLike> SummaryDefinition<I> {
    /// Start a definition for cart-like records, with cart items and
    /// percent-off vouchers already wired in
    pub fn cart_builder(name: impl Into<String>) -> SummaryDefinitionBuilder<I> {
        Self::builder(name)
            .items_adapter(CartItemsAdapter)
            .voucher_adapter(PercentVoucherAdapter)
    }
}

impl<I> fmt::Debug for SummaryDefinition<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryDefinition")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("vouchers", &self.vouchers.is_some())
            .field("policy", &self.policy)
            .field("computed", &self.computed_names())
            .finish()
    }
}

/// Builder for [`SummaryDefinition`]
pub struct SummaryDefinitionBuilder<I> {
    name: String,
    registry: ExtraRegistry<I>,
    items: Option<BoxedItemsAdapter<I>>,
    vouchers: Option<BoxedVoucherAdapter<I>>,
    policy: SummaryPolicy,
    computed: Vec<(String, ComputedFn<I>)>,
}

impl<I> SummaryDefinitionBuilder<I> {
    /// Builder: set the extra registry
    pub fn registry(mut self, registry: ExtraRegistry<I>) -> Self {
        self.registry = registry;
        self
    }

    /// Builder: set the items adapter
    pub fn items_adapter(mut self, adapter: impl ItemsAdapter<I> + 'static) -> Self {
        let adapter: BoxedItemsAdapter<I> = Arc::new(adapter);
        self.items = Some(adapter);
        self
    }

    /// The items adapter set so far
    pub fn items(&self) -> Option<&BoxedItemsAdapter<I>> {
        self.items.as_ref()
    }

    /// Builder: set the voucher adapter
    pub fn voucher_adapter(mut self, adapter: impl VoucherAdapter<I> + 'static) -> Self {
        let adapter: BoxedVoucherAdapter<I> = Arc::new(adapter);
        self.vouchers = Some(adapter);
        self
    }

    /// Builder: summarize without vouchers
    pub fn without_vouchers(mut self) -> Self {
        self.vouchers = None;
        self
    }

    /// Builder: set the rounding policy
    pub fn policy(mut self, policy: SummaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: attach a custom computed value under `name`
    pub fn computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Summary<'_, I>, &I) -> Result<Decimal, BoxError> + Send + Sync + 'static,
    {
        let compute: ComputedFn<I> = Arc::new(compute);
        self.computed.push((name.into(), compute));
        self
    }

    /// Finish the definition
    pub fn build(self) -> SummaryResult<SummaryDefinition<I>> {
        let items = self.items.ok_or_else(|| {
            SummaryError::Configuration(format!("summary '{}' has no items adapter", self.name))
        })?;

        for (index, (name, _)) in self.computed.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SummaryError::Configuration(format!(
                    "summary '{}' has a computed value without a name",
                    self.name
                )));
            }
            if self.computed[..index].iter().any(|(other, _)| other == name) {
                return Err(SummaryError::Configuration(format!(
                    "summary '{}' declares computed value '{}' twice",
                    self.name, name
                )));
            }
            if self.registry.contains(name) {
                return Err(SummaryError::Configuration(format!(
                    "summary '{}' computed value '{}' shadows an extra",
                    self.name, name
                )));
            }
        }

        debug!(
            summary = %self.name,
            extras = self.registry.len(),
            computed = self.computed.len(),
            "summary definition built"
        );

        Ok(SummaryDefinition {
            name: self.name,
            registry: self.registry,
            items,
            vouchers: self.vouchers,
            policy: self.policy,
            computed: self.computed,
        })
    }
}

/// A summary definition bound to one instance.
///
/// Nothing is resolved at construction. Each resolver runs at most once per
/// `Summary`, on the first access that needs it; a fresh `Summary` over the
/// same instance starts with empty caches.
pub struct Summary<'a, I> {
    definition: &'a SummaryDefinition<I>,
    instance: &'a I,
    items: OnceCell<Vec<ResolvedItem>>,
    items_total: OnceCell<Decimal>,
    extras: Vec<OnceCell<ResolvedExtra>>,
    vouchers: OnceCell<Vec<ResolvedExtra>>,
    included_total: OnceCell<Decimal>,
    extras_total: OnceCell<Decimal>,
    computed: Vec<OnceCell<Decimal>>,
    resolving: Vec<Cell<bool>>,
}

impl<'a, I> Summary<'a, I> {
    /// Bind `definition` to `instance`
    pub fn new(definition: &'a SummaryDefinition<I>, instance: &'a I) -> Self {
        Self {
            definition,
            instance,
            items: OnceCell::new(),
            items_total: OnceCell::new(),
            extras: (0..definition.registry.len()).map(|_| OnceCell::new()).collect(),
            vouchers: OnceCell::new(),
            included_total: OnceCell::new(),
            extras_total: OnceCell::new(),
            computed: (0..definition.computed.len()).map(|_| OnceCell::new()).collect(),
            resolving: (0..definition.computed.len()).map(|_| Cell::new(false)).collect(),
        }
    }

    /// The bound instance
    pub fn instance(&self) -> &'a I {
        self.instance
    }

    /// The definition this summary was built from
    pub fn definition(&self) -> &'a SummaryDefinition<I> {
        self.definition
    }

    /// Line items in the instance's natural order
    pub fn items(&self) -> SummaryResult<&[ResolvedItem]> {
        let items = cached(&self.items, || {
            self.definition
                .items
                .items(self.instance)
                .map_err(|e| SummaryError::computation("items", e))
        })?;
        Ok(items.as_slice())
    }

    /// Sum of item line totals
    pub fn items_total(&self) -> SummaryResult<Decimal> {
        cached(&self.items_total, || items::items_total(self.items()?)).copied()
    }

    /// A single extra, resolved on first access
    pub fn extra(&self, key: &str) -> SummaryResult<&ResolvedExtra> {
        let index = self
            .definition
            .registry
            .position(key)
            .ok_or_else(|| SummaryError::UnknownExtra {
                key: key.to_string(),
            })?;
        self.extra_at(index)
    }

    /// All declared extras in declaration order
    pub fn extras(&self) -> SummaryResult<Vec<&ResolvedExtra>> {
        (0..self.extras.len()).map(|i| self.extra_at(i)).collect()
    }

    /// Voucher discounts in voucher order
    pub fn vouchers(&self) -> SummaryResult<&[ResolvedExtra]> {
        let discounts = cached(&self.vouchers, || match &self.definition.vouchers {
            Some(adapter) => adapter
                .discounts(self.instance, self.items_total()?, &self.definition.policy)
                .map_err(|e| SummaryError::computation("vouchers", e)),
            None => Ok(Vec::new()),
        })?;
        Ok(discounts.as_slice())
    }

    /// Sum of voucher discounts (negative or zero)
    pub fn vouchers_total(&self) -> SummaryResult<Decimal> {
        voucher::vouchers_total(self.vouchers()?)
    }

    /// Sum of extras already embedded in item prices
    pub fn included_total(&self) -> SummaryResult<Decimal> {
        cached(&self.included_total, || {
            let extras = self.extras()?;
            money::checked_sum(extras.into_iter().filter(|e| e.included).map(|e| e.amount))
                .ok_or_else(|| money::overflow("included_total"))
        })
        .copied()
    }

    /// Items total with included extras backed out
    pub fn items_pretax(&self) -> SummaryResult<Decimal> {
        self.items_total()?
            .checked_sub(self.included_total()?)
            .ok_or_else(|| money::overflow("items_pretax"))
    }

    /// Non-included extras plus voucher discounts
    pub fn extras_total(&self) -> SummaryResult<Decimal> {
        cached(&self.extras_total, || {
            let extras = self.extras()?;
            let vouchers = self.vouchers_total()?;
            let declared = extras.into_iter().filter(|e| !e.included).map(|e| e.amount);
            money::checked_sum(declared.chain(std::iter::once(vouchers)))
                .ok_or_else(|| money::overflow("extras_total"))
        })
        .copied()
    }

    /// Items total plus extras total
    pub fn total(&self) -> SummaryResult<Decimal> {
        self.items_total()?
            .checked_add(self.extras_total()?)
            .ok_or_else(|| money::overflow("total"))
    }

    /// Total clamped at zero
    pub fn total_prevent_negative(&self) -> SummaryResult<Decimal> {
        let total = self.total()?;
        if total.is_sign_negative() && !total.is_zero() {
            warn!(
                summary = %self.definition.name,
                %total,
                "negative total clamped to zero"
            );
            return Ok(Decimal::ZERO);
        }
        Ok(total)
    }

    /// Amount to charge: clamped or raw total depending on policy
    pub fn amount_due(&self) -> SummaryResult<Decimal> {
        if self.definition.policy.prevent_negative {
            self.total_prevent_negative()
        } else {
            self.total()
        }
    }

    /// A custom computed value, resolved on first access
    pub fn value(&self, name: &str) -> SummaryResult<Decimal> {
        let index = self
            .definition
            .computed
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| SummaryError::UnknownValue {
                name: name.to_string(),
            })?;
        if let Some(value) = self.computed[index].get() {
            return Ok(*value);
        }

        // a value reached again while it is still resolving depends on itself
        let resolving = &self.resolving[index];
        if resolving.replace(true) {
            return Err(SummaryError::Configuration(format!(
                "computed value '{}' depends on itself",
                name
            )));
        }
        let compute = &self.definition.computed[index].1;
        let result = cached(&self.computed[index], || {
            compute(self, self.instance).map_err(|e| SummaryError::computation(name, e))
        })
        .copied();
        resolving.set(false);
        result
    }

    /// Resolve everything into a serializable snapshot
    pub fn render(&self) -> SummaryResult<RenderedSummary> {
        let values = self
            .definition
            .computed
            .iter()
            .map(|(name, _)| -> SummaryResult<ComputedValue> {
                Ok(ComputedValue {
                    name: name.clone(),
                    value: self.value(name)?,
                })
            })
            .collect::<SummaryResult<Vec<_>>>()?;

        Ok(RenderedSummary {
            items: self.items()?.to_vec(),
            items_total: self.items_total()?,
            items_pretax: self.items_pretax()?,
            extras: self.extras()?.into_iter().cloned().collect(),
            vouchers: self.vouchers()?.to_vec(),
            vouchers_total: self.vouchers_total()?,
            extras_total: self.extras_total()?,
            total: self.total()?,
            total_prevent_negative: self.total_prevent_negative()?,
            amount_due: self.amount_due()?,
            values,
        })
    }

    fn extra_at(&self, index: usize) -> SummaryResult<&ResolvedExtra> {
        cached(&self.extras[index], || {
            let extra = self
                .definition
                .registry
                .get_index(index)
                .ok_or_else(|| SummaryError::UnknownExtra {
                    key: format!("#{}", index),
                })?;
            extra.resolve(self.instance)
        })
    }
}

impl<I> fmt::Debug for Summary<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summary")
            .field("definition", &self.definition.name)
            .field("items", &self.items.get())
            .field("items_total", &self.items_total.get())
            .field("extras_total", &self.extras_total.get())
            .finish()
    }
}

/// Fill `cell` from a fallible initializer; errors leave the cell empty
fn cached<T, F>(cell: &OnceCell<T>, init: F) -> SummaryResult<&T>
where
    F: FnOnce() -> SummaryResult<T>,
{
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

/// A named custom value in a rendered summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedValue {
    pub name: String,
    pub value: Decimal,
}

/// Fully resolved summary, ready for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSummary {
    pub items: Vec<ResolvedItem>,
    pub items_total: Decimal,
    pub items_pretax: Decimal,
    pub extras: Vec<ResolvedExtra>,
    pub vouchers: Vec<ResolvedExtra>,
    pub vouchers_total: Decimal,
    pub extras_total: Decimal,
    pub total: Decimal,
    pub total_prevent_negative: Decimal,
    pub amount_due: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ComputedValue>,
}

/// Generate a trait of named accessors over [`Summary::extra`].
///
/// ```rust,ignore
/// summary_core::extra_accessors! {
///     pub trait CartExtras { my_commission, tax, discount, delivery }
/// }
///
/// let tax = summary.tax()?;
/// ```
#[macro_export]
macro_rules! extra_accessors {
    ($(#[$meta:meta])* $vis:vis trait $name:ident { $($key:ident),* $(,)? }) => {
        $(#[$meta])*
        $vis trait $name {
            $(
                fn $key(&self) -> $crate::SummaryResult<&$crate::ResolvedExtra>;
            )*
        }

        impl<'a, I> $name for $crate::Summary<'a, I> {
            $(
                fn $key(&self) -> $crate::SummaryResult<&$crate::ResolvedExtra> {
                    self.extra(stringify!($key))
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, Product, Voucher};
    use crate::extra::Extra;
    use crate::field::Field;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cart(first_quantity: u32) -> Cart {
        let mut cart = Cart::new(1);
        cart.add_product(Product::new("p1", "Stamp", Decimal::new(1, 2)), first_quantity);
        cart.add_product(Product::new("p2", "Atlas", Decimal::new(1122, 2)), 1);
        cart
    }

    fn definition() -> SummaryDefinition<Cart> {
        let registry = ExtraRegistry::builder()
            .extra(Extra::new("my_commission").amount(Decimal::new(1002, 2)))
            .extra(Extra::new("tax").amount(Decimal::new(1003, 2)).included(true))
            .extra(Extra::new("discount").amount(Decimal::new(-1223, 2)))
            .extra(Extra::new("delivery").amount(Field::from_fn(|_: &Cart| Decimal::new(1001, 2))))
            .build()
            .unwrap();
        SummaryDefinition::cart_builder("cart")
            .registry(registry)
            .build()
            .unwrap()
    }

    #[test]
    fn test_totals() {
        let definition = definition();
        let cart = cart(7);
        let summary = definition.summarize(&cart);

        assert_eq!(summary.items_total().unwrap(), Decimal::new(1129, 2));
        assert_eq!(summary.items_pretax().unwrap(), Decimal::new(126, 2));
        assert_eq!(summary.extras_total().unwrap(), Decimal::new(780, 2));
        assert_eq!(summary.total().unwrap(), Decimal::new(1909, 2));
        assert_eq!(summary.total_prevent_negative().unwrap(), Decimal::new(1909, 2));
    }

    #[test]
    fn test_negative_total_clamped() {
        let definition = definition();
        let mut cart = cart(7);
        cart.add_voucher(Voucher::new("HALFPRICEX4", Decimal::from(200)));
        let summary = definition.summarize(&cart);

        assert_eq!(summary.vouchers_total().unwrap(), Decimal::new(-2258, 2));
        assert_eq!(summary.total().unwrap(), Decimal::new(-349, 2));
        assert_eq!(summary.total_prevent_negative().unwrap(), Decimal::ZERO);
        assert_eq!(summary.amount_due().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_amount_due_without_clamping() {
        let registry = ExtraRegistry::builder()
            .extra(Extra::new("refund").amount(Decimal::from(-5)))
            .build()
            .unwrap();
        let definition = SummaryDefinition::cart_builder("refunds")
            .registry(registry)
            .policy(SummaryPolicy::default().with_prevent_negative(false))
            .build()
            .unwrap();
        let cart = Cart::new(1);
        let summary = definition.summarize(&cart);

        assert_eq!(summary.amount_due().unwrap(), Decimal::from(-5));
        assert_eq!(summary.total_prevent_negative().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_resolver_runs_once_per_summary() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = ExtraRegistry::builder()
            .extra(Extra::new("delivery").amount(Field::from_fn(move |_: &Cart| {
                counter.fetch_add(1, Ordering::SeqCst);
                Decimal::from(5)
            })))
            .build()
            .unwrap();
        let definition = SummaryDefinition::cart_builder("cart")
            .registry(registry)
            .build()
            .unwrap();
        let cart = cart(1);

        let summary = definition.summarize(&cart);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        summary.extra("delivery").unwrap();
        summary.total().unwrap();
        summary.items_pretax().unwrap();
        summary.extras().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // a second summary over the same cart does not share the cache
        let again = definition.summarize(&cart);
        again.total().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_lookups() {
        let definition = definition();
        let cart = cart(1);
        let summary = definition.summarize(&cart);

        assert!(matches!(
            summary.extra("surcharge"),
            Err(SummaryError::UnknownExtra { .. })
        ));
        assert!(matches!(
            summary.value("custom_total"),
            Err(SummaryError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_resolver_error_surfaces_on_access() {
        let registry = ExtraRegistry::builder()
            .extra(Extra::new("my_commission").amount(Decimal::ONE))
            .extra(Extra::new("delivery").amount(Field::<Cart, Decimal>::try_from_fn(
                |_: &Cart| Err("no postcode".into()),
            )))
            .build()
            .unwrap();
        let definition = SummaryDefinition::cart_builder("cart")
            .registry(registry)
            .build()
            .unwrap();
        let cart = cart(1);

        let summary = definition.summarize(&cart);
        assert_eq!(summary.extra("my_commission").unwrap().amount, Decimal::ONE);
        assert!(matches!(
            summary.total(),
            Err(SummaryError::Computation { .. })
        ));
    }

    #[test]
    fn test_computed_values() {
        let definition = SummaryDefinition::cart_builder("cart")
            .registry(definition().registry().clone())
            .computed("custom_total", |_, _| Ok(Decimal::from(42)))
            .computed("pretax_per_item", |summary, cart: &Cart| {
                let count = Decimal::from(cart.item_count());
                Ok(summary.items_pretax()? / count)
            })
            .build()
            .unwrap();
        let cart = cart(1);
        let summary = definition.summarize(&cart);

        assert_eq!(summary.value("custom_total").unwrap(), Decimal::from(42));
        // (11.23 - 10.03) / 2
        assert_eq!(summary.value("pretax_per_item").unwrap(), Decimal::new(60, 2));
    }

    #[test]
    fn test_definition_validation() {
        let missing_items = SummaryDefinition::<Cart>::builder("bare").build();
        assert!(matches!(missing_items, Err(SummaryError::Configuration(_))));

        let duplicate = SummaryDefinition::<Cart>::cart_builder("dup")
            .computed("x", |_, _| Ok(Decimal::ONE))
            .computed("x", |_, _| Ok(Decimal::ONE))
            .build();
        assert!(matches!(duplicate, Err(SummaryError::Configuration(_))));

        let shadowing = SummaryDefinition::cart_builder("shadow")
            .registry(definition().registry().clone())
            .computed("tax", |_, _| Ok(Decimal::ONE))
            .build();
        assert!(matches!(shadowing, Err(SummaryError::Configuration(_))));
    }

    #[test]
    fn test_render_snapshot() {
        let definition = definition();
        let mut cart = cart(1);
        cart.add_voucher(Voucher::new("TENOFF", Decimal::from(10)));
        let rendered = definition.summarize(&cart).render().unwrap();

        assert_eq!(rendered.items.len(), 2);
        assert_eq!(rendered.extras.len(), 4);
        assert_eq!(rendered.extras[3].key, "delivery");
        assert_eq!(rendered.vouchers_total, Decimal::new(-112, 2));
        assert_eq!(
            rendered.total,
            rendered.items_total + rendered.extras_total
        );
    }

    #[test]
    fn test_sub_cent_amounts_add_up() {
        let registry = ExtraRegistry::builder()
            .extra(
                Extra::new("tax")
                    .amount(Field::from_fn(|_: &Cart| Decimal::new(16845, 4)))
                    .included(true),
            )
            .extra(Extra::new("fee").amount(Decimal::new(1005, 3)))
            .build()
            .unwrap();
        let definition = SummaryDefinition::cart_builder("cart")
            .registry(registry)
            .build()
            .unwrap();
        let mut cart = Cart::new(1);
        cart.add_product(Product::new("p1", "Atlas", Decimal::new(1123, 2)), 1);
        cart.add_product(Product::new("p2", "Pin", Decimal::new(5, 3)), 1);
        let rendered = definition.summarize(&cart).render().unwrap();

        let lines: Decimal = rendered.items.iter().map(|i| i.line_total).sum();
        let included: Decimal = rendered.extras.iter().filter(|e| e.included).map(|e| e.amount).sum();
        let declared: Decimal = rendered.extras.iter().filter(|e| !e.included).map(|e| e.amount).sum();

        assert_eq!(rendered.items_total, lines);
        assert_eq!(rendered.items_total, Decimal::new(11235, 3));
        assert_eq!(rendered.items_pretax, rendered.items_total - included);
        assert_eq!(rendered.items_pretax, Decimal::new(95505, 4));
        assert_eq!(rendered.extras_total, declared + rendered.vouchers_total);
        assert_eq!(rendered.extras_total, Decimal::new(1005, 3));
        assert_eq!(rendered.total, rendered.items_total + rendered.extras_total);
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let definition = definition();
        let mut cart = Cart::new(1);
        cart.add_product(Product::new("p1", "Vault", Decimal::MAX), 2);
        let summary = definition.summarize(&cart);

        assert!(matches!(summary.items(), Err(SummaryError::Computation { .. })));
        assert!(matches!(summary.total(), Err(SummaryError::Computation { .. })));
        assert!(matches!(summary.render(), Err(SummaryError::Computation { .. })));

        let mut cart = Cart::new(2);
        cart.add_product(Product::new("p1", "Vault", Decimal::MAX), 1);
        cart.add_product(Product::new("p2", "Vault", Decimal::MAX), 1);
        let summary = definition.summarize(&cart);

        assert!(matches!(summary.items_total(), Err(SummaryError::Computation { .. })));
    }

    #[test]
    fn test_self_referencing_value_is_rejected() {
        let definition = SummaryDefinition::<Cart>::cart_builder("cart")
            .computed("looping", |summary, _| Ok(summary.value("looping")?))
            .computed("ping", |summary, _| Ok(summary.value("pong")? + Decimal::ONE))
            .computed("pong", |summary, _| Ok(summary.value("ping")? + Decimal::ONE))
            .build()
            .unwrap();
        let cart = cart(1);
        let summary = definition.summarize(&cart);

        let err = summary.value("looping").unwrap_err();
        assert!(matches!(err, SummaryError::Computation { .. }));
        assert!(err.to_string().contains("depends on itself"));

        let err = summary.value("ping").unwrap_err();
        assert!(err.to_string().contains("depends on itself"));

        // the guard is released after a failure
        assert!(summary.value("looping").is_err());
    }

    crate::extra_accessors! {
        trait TestExtras { tax, delivery }
    }

    #[test]
    fn test_generated_accessors() {
        let definition = definition();
        let cart = cart(1);
        let summary = definition.summarize(&cart);

        assert_eq!(summary.tax().unwrap().amount, Decimal::new(1003, 2));
        assert_eq!(summary.delivery().unwrap().verbose_name, "delivery");
    }
}
