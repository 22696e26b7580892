//! # Extras
//!
//! An extra is a named monetary adjustment line (tax, discount, delivery,
//! commission). [`Extra`] is the declaration; [`ResolvedExtra`] is the
//! immutable snapshot of that declaration evaluated against one instance.

use crate::error::{SummaryError, SummaryResult};
use crate::field::{humanize, Field, IntoField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Declaration of a single extra.
///
/// Unset fields fall back to defaults at resolution: `verbose_name` to the
/// humanized key, `description` to none, `included` to false. `amount` has no
/// default; a registry refuses to build while it is missing.
pub struct Extra<I> {
    key: String,
    verbose_name: Option<Field<I, String>>,
    description: Option<Field<I, String>>,
    amount: Option<Field<I, Decimal>>,
    included: Field<I, bool>,
}

impl<I> Extra<I> {
    /// Start declaring an extra under `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            verbose_name: None,
            description: None,
            amount: None,
            included: Field::Literal(false),
        }
    }

    /// Builder: set display name (literal or computed)
    pub fn verbose_name(mut self, name: impl IntoField<I, String>) -> Self {
        self.verbose_name = Some(name.into_field());
        self
    }

    /// Builder: set description (literal or computed)
    pub fn description(mut self, description: impl IntoField<I, String>) -> Self {
        self.description = Some(description.into_field());
        self
    }

    /// Builder: set amount (literal or computed)
    pub fn amount(mut self, amount: impl IntoField<I, Decimal>) -> Self {
        self.amount = Some(amount.into_field());
        self
    }

    /// Builder: mark as already embedded in item prices
    pub fn included(mut self, included: impl IntoField<I, bool>) -> Self {
        self.included = included.into_field();
        self
    }

    /// Registry key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared amount field
    pub fn amount_field(&self) -> Option<&Field<I, Decimal>> {
        self.amount.as_ref()
    }

    /// Display name when it does not depend on the instance
    pub fn literal_verbose_name(&self) -> Option<String> {
        match &self.verbose_name {
            Some(field) => field.as_literal().cloned(),
            None => Some(humanize(&self.key)),
        }
    }

    /// Description when it does not depend on the instance
    pub fn literal_description(&self) -> Option<String> {
        self.description
            .as_ref()
            .and_then(|field| field.as_literal().cloned())
    }

    /// Included flag when it does not depend on the instance
    pub fn literal_included(&self) -> Option<bool> {
        self.included.as_literal().copied()
    }

    /// Check the declaration is complete
    pub(crate) fn validate(&self) -> SummaryResult<()> {
        if self.key.trim().is_empty() {
            return Err(SummaryError::Configuration(
                "extra key must not be empty".to_string(),
            ));
        }
        if self.amount.is_none() {
            return Err(SummaryError::Configuration(format!(
                "extra '{}' has no amount",
                self.key
            )));
        }
        Ok(())
    }

    /// Evaluate every field against `instance`
    pub fn resolve(&self, instance: &I) -> SummaryResult<ResolvedExtra> {
        trace!(key = %self.key, "resolving extra");

        let verbose_name = match &self.verbose_name {
            Some(field) => field
                .resolve(instance)
                .map_err(|e| self.failure("verbose_name", e))?,
            None => humanize(&self.key),
        };

        let description = match &self.description {
            Some(field) => Some(
                field
                    .resolve(instance)
                    .map_err(|e| self.failure("description", e))?,
            ),
            None => None,
        };

        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| {
                SummaryError::Configuration(format!("extra '{}' has no amount", self.key))
            })?
            .resolve(instance)
            .map_err(|e| self.failure("amount", e))?;

        let included = self
            .included
            .resolve(instance)
            .map_err(|e| self.failure("included", e))?;

        Ok(ResolvedExtra {
            key: self.key.clone(),
            verbose_name,
            description,
            amount,
            included,
        })
    }

    fn failure(&self, field: &str, source: crate::error::BoxError) -> SummaryError {
        SummaryError::computation(format!("{}.{}", self.key, field), source)
    }
}

impl<I> Clone for Extra<I> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            verbose_name: self.verbose_name.clone(),
            description: self.description.clone(),
            amount: self.amount.clone(),
            included: self.included.clone(),
        }
    }
}

impl<I> fmt::Debug for Extra<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extra")
            .field("key", &self.key)
            .field("verbose_name", &self.verbose_name)
            .field("description", &self.description)
            .field("amount", &self.amount)
            .field("included", &self.included)
            .finish()
    }
}

/// An extra evaluated against one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExtra {
    /// Registry key (or synthesized voucher key)
    pub key: String,

    /// Display name
    pub verbose_name: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Signed amount; discounts are negative
    pub amount: Decimal,

    /// Already embedded in item prices (e.g. tax-inclusive pricing)
    pub included: bool,
}
