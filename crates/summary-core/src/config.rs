//! # Summary Configuration
//!
//! Declarative extras and policy, loaded from TOML (usually
//! `config/summary.toml`). A configuration can build a registry on its own or
//! override a registry declared in code, key by key.
//!
//! A `percent` extra is a percentage of the items total, read through the
//! same items adapter the summary uses.
//!
//! ```toml
//! remove = ["discount"]
//!
//! [policy]
//! decimal_places = 2
//! rounding = "half_up"
//! prevent_negative = true
//!
//! [[extras]]
//! key = "tax"
//! verbose_name = "GST"
//! description = "15%"
//! percent = "15"
//! included = true
//!
//! [[extras]]
//! key = "delivery"
//! amount = "10.01"
//! ```

use crate::cart::CartLike;
use crate::error::{SummaryError, SummaryResult};
use crate::extra::Extra;
use crate::field::Field;
use crate::items::{items_total, BoxedItemsAdapter, CartItemsAdapter};
use crate::money;
use crate::policy::SummaryPolicy;
use crate::registry::ExtraRegistry;
use crate::summary::{SummaryDefinition, SummaryDefinitionBuilder};
use std::sync::Arc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One extra declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraConfig {
    /// Registry key
    pub key: String,

    /// Display name (defaults to the humanized key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fixed amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Percentage of the items total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Decimal>,

    /// Already embedded in item prices
    #[serde(default)]
    pub included: bool,
}

impl ExtraConfig {
    /// Turn the entry into an extra declaration; `items` supplies the base
    /// of a percentage amount
    pub fn to_extra<I: 'static>(
        &self,
        policy: SummaryPolicy,
        items: &BoxedItemsAdapter<I>,
    ) -> SummaryResult<Extra<I>> {
        let amount: Field<I, Decimal> = match (self.amount, self.percent) {
            (Some(amount), None) => Field::Literal(amount),
            (None, Some(percent)) => {
                let items = Arc::clone(items);
                let key = self.key.clone();
                Field::try_from_fn(move |instance: &I| {
                    let base = items_total(&items.items(instance)?)?;
                    let amount = money::percent_of(base, percent)
                        .ok_or_else(|| money::overflow(format!("{}.amount", key)))?;
                    Ok(policy.round(amount))
                })
            }
            (Some(_), Some(_)) => {
                return Err(SummaryError::Configuration(format!(
                    "extra '{}' sets both amount and percent",
                    self.key
                )))
            }
            (None, None) => {
                return Err(SummaryError::Configuration(format!(
                    "extra '{}' has no amount",
                    self.key
                )))
            }
        };

        let mut extra = Extra::new(self.key.clone())
            .amount(amount)
            .included(self.included);
        if let Some(name) = &self.verbose_name {
            extra = extra.verbose_name(name.clone());
        }
        if let Some(description) = &self.description {
            extra = extra.description(description.clone());
        }
        Ok(extra)
    }
}

/// Policy plus extra declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Inherited extras to drop
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,

    /// Rounding and clamping
    #[serde(default)]
    pub policy: SummaryPolicy,

    /// Extras to add or override, in order
    #[serde(default)]
    pub extras: Vec<ExtraConfig>,
}

impl SummaryConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> SummaryResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Build a registry for cart-like records from this configuration alone
    pub fn registry<I: CartLike + 'static>(&self) -> SummaryResult<ExtraRegistry<I>> {
        self.apply(&ExtraRegistry::empty())
    }

    /// Derive a registry for cart-like records from `base`
    pub fn apply<I: CartLike + 'static>(
        &self,
        base: &ExtraRegistry<I>,
    ) -> SummaryResult<ExtraRegistry<I>> {
        let items: BoxedItemsAdapter<I> = Arc::new(CartItemsAdapter);
        self.apply_with(base, &items)
    }

    /// Derive a registry from `base`: removals first, then additions and
    /// in-place overrides. Percentage extras read their base through `items`.
    pub fn apply_with<I: 'static>(
        &self,
        base: &ExtraRegistry<I>,
        items: &BoxedItemsAdapter<I>,
    ) -> SummaryResult<ExtraRegistry<I>> {
        let mut builder = base.extend();
        for key in &self.remove {
            builder = builder.remove(key);
        }
        for entry in &self.extras {
            builder = builder.extra(entry.to_extra(self.policy, items)?);
        }
        builder.build()
    }

    /// Finish `builder` with the registry derived from `base` and this
    /// configuration's policy. The builder's items adapter feeds percentage
    /// extras.
    pub fn configure<I: 'static>(
        &self,
        builder: SummaryDefinitionBuilder<I>,
        base: &ExtraRegistry<I>,
    ) -> SummaryResult<SummaryDefinition<I>> {
        let items = builder.items().cloned().ok_or_else(|| {
            SummaryError::Configuration(
                "percentage extras need an items adapter on the summary".to_string(),
            )
        })?;
        let registry = self.apply_with(base, &items)?;
        builder.registry(registry).policy(self.policy).build()
    }

    /// Build a cart summary definition over `base` with this configuration's policy
    pub fn definition<I: CartLike + 'static>(
        &self,
        name: impl Into<String>,
        base: &ExtraRegistry<I>,
    ) -> SummaryResult<SummaryDefinition<I>> {
        self.configure(SummaryDefinition::cart_builder(name), base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, Product};
    use crate::error::BoxError;
    use crate::items::{ItemsAdapter, ResolvedItem};

    const CONFIG: &str = r#"
        [policy]
        decimal_places = 2
        rounding = "half_up"

        [[extras]]
        key = "tax"
        verbose_name = "GST"
        description = "15%"
        percent = "15"
        included = true

        [[extras]]
        key = "delivery"
        amount = "10.01"
    "#;

    fn cart() -> Cart {
        let mut cart = Cart::new(1);
        cart.add_product(Product::new("p1", "Stamp", Decimal::new(1, 2)), 1);
        cart.add_product(Product::new("p2", "Atlas", Decimal::new(1122, 2)), 1);
        cart
    }

    #[test]
    fn test_registry_from_toml() {
        let config = SummaryConfig::from_toml(CONFIG).unwrap();
        let definition = config.definition::<Cart>("cart", &ExtraRegistry::empty()).unwrap();
        let cart = cart();
        let summary = definition.summarize(&cart);

        assert_eq!(definition.registry().keys(), vec!["tax", "delivery"]);

        let tax = summary.extra("tax").unwrap();
        assert_eq!(tax.verbose_name, "GST");
        // 15% of 11.23 = 1.6845
        assert_eq!(tax.amount, Decimal::new(168, 2));
        assert!(tax.included);

        let delivery = summary.extra("delivery").unwrap();
        assert_eq!(delivery.verbose_name, "delivery");
        assert_eq!(delivery.amount, Decimal::new(1001, 2));
        assert_eq!(summary.total().unwrap(), Decimal::new(2124, 2));
    }

    #[test]
    fn test_apply_overrides_code_registry() {
        let base = ExtraRegistry::<Cart>::builder()
            .extra(Extra::new("my_commission").amount(Decimal::new(1002, 2)))
            .extra(Extra::new("delivery").amount(Decimal::new(500, 2)))
            .extra(Extra::new("discount").amount(Decimal::new(-1223, 2)))
            .build()
            .unwrap();
        let config = SummaryConfig::from_toml(
            r#"
            remove = ["discount"]

            [[extras]]
            key = "delivery"
            amount = "7.50"
            "#,
        )
        .unwrap();

        let registry = config.apply(&base).unwrap();

        assert_eq!(registry.keys(), vec!["my_commission", "delivery"]);
        assert_eq!(
            registry.get("delivery").and_then(|e| e.amount_field()).and_then(Field::as_literal),
            Some(&Decimal::new(750, 2))
        );
    }

    #[test]
    fn test_amount_and_percent_are_exclusive() {
        let both = SummaryConfig::from_toml(
            r#"
            [[extras]]
            key = "tax"
            amount = "1"
            percent = "10"
            "#,
        )
        .unwrap();
        assert!(matches!(
            both.registry::<Cart>(),
            Err(SummaryError::Configuration(_))
        ));

        let neither = SummaryConfig::from_toml(
            r#"
            [[extras]]
            key = "tax"
            "#,
        )
        .unwrap();
        assert!(matches!(
            neither.registry::<Cart>(),
            Err(SummaryError::Configuration(_))
        ));
    }

    /// Only counts items priced at one unit or more
    struct FullPriceItems;

    impl ItemsAdapter<Cart> for FullPriceItems {
        fn items(&self, cart: &Cart) -> Result<Vec<ResolvedItem>, BoxError> {
            let items = CartItemsAdapter.items(cart)?;
            Ok(items.into_iter().filter(|i| i.unit_price >= Decimal::ONE).collect())
        }
    }

    #[test]
    fn test_percent_follows_summary_items_adapter() {
        let config = SummaryConfig::from_toml(CONFIG).unwrap();
        let builder = SummaryDefinition::<Cart>::builder("full_price").items_adapter(FullPriceItems);
        let definition = config.configure(builder, &ExtraRegistry::empty()).unwrap();
        let cart = cart();
        let summary = definition.summarize(&cart);

        assert_eq!(summary.items_total().unwrap(), Decimal::new(1122, 2));
        // 15% of 11.22 = 1.683, not 15% of 11.23
        assert_eq!(summary.extra("tax").unwrap().amount, Decimal::new(168, 2));
        assert_eq!(summary.items_pretax().unwrap(), Decimal::new(954, 2));
    }

    #[test]
    fn test_configure_needs_items_adapter() {
        let config = SummaryConfig::from_toml(CONFIG).unwrap();
        let result = config.configure(SummaryDefinition::<Cart>::builder("bare"), &ExtraRegistry::empty());

        assert!(matches!(result, Err(SummaryError::Configuration(_))));
    }

    #[test]
    fn test_overflowing_percent_is_an_error() {
        let config = SummaryConfig::from_toml(CONFIG).unwrap();
        let definition = config.definition::<Cart>("cart", &ExtraRegistry::empty()).unwrap();
        let mut cart = Cart::new(1);
        cart.add_product(Product::new("p1", "Vault", Decimal::MAX), 1);
        let summary = definition.summarize(&cart);

        match summary.extra("tax") {
            Err(SummaryError::Computation { target, .. }) => assert_eq!(target, "tax.amount"),
            other => panic!("expected computation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_toml_is_configuration_error() {
        let result = SummaryConfig::from_toml("[[extras]]\nkey = ");
        assert!(matches!(result, Err(SummaryError::Configuration(_))));
    }

    #[test]
    fn test_empty_config() {
        let config = SummaryConfig::from_toml("").unwrap();

        assert_eq!(config.policy, SummaryPolicy::default());
        assert!(config.registry::<Cart>().unwrap().is_empty());
    }
}
