//! # Extra Registry
//!
//! Ordered, key-unique collection of [`Extra`] declarations.
//!
//! A registry is immutable once built. Deriving a new registry from an
//! existing one goes through [`ExtraRegistry::extend`], which copies the
//! parent into a builder where extras can be added, overridden in place or
//! removed:
//!
//! ```text
//! base:    [my_commission, tax, discount, delivery]
//!             │
//!             ▼ extend()
//! builder: + extra(tax')        → replaces tax, keeps slot 2
//!          + extra(gift_wrap)   → appended
//!          - remove(discount)
//!             │
//!             ▼ build()
//! child:   [my_commission, tax', delivery, gift_wrap]
//! ```

use crate::error::{SummaryError, SummaryResult};
use crate::extra::Extra;
use std::fmt;
use tracing::debug;

/// Ordered set of extra declarations keyed by name
pub struct ExtraRegistry<I> {
    extras: Vec<Extra<I>>,
}

impl<I> ExtraRegistry<I> {
    /// Registry with no extras
    pub fn empty() -> Self {
        Self { extras: Vec::new() }
    }

    /// Start building a registry from scratch
    pub fn builder() -> ExtraRegistryBuilder<I> {
        ExtraRegistryBuilder::new()
    }

    /// Start building a child registry seeded with a copy of this one
    pub fn extend(&self) -> ExtraRegistryBuilder<I> {
        ExtraRegistryBuilder {
            extras: self.extras.clone(),
            error: None,
        }
    }

    /// Get an extra by key
    pub fn get(&self, key: &str) -> Option<&Extra<I>> {
        self.extras.iter().find(|e| e.key() == key)
    }

    /// Get an extra by declaration index
    pub fn get_index(&self, index: usize) -> Option<&Extra<I>> {
        self.extras.get(index)
    }

    /// Declaration index of a key
    pub fn position(&self, key: &str) -> Option<usize> {
        self.extras.iter().position(|e| e.key() == key)
    }

    /// Check if a key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Extra<I>> {
        self.extras.iter()
    }

    /// All keys in declaration order
    pub fn keys(&self) -> Vec<&str> {
        self.extras.iter().map(|e| e.key()).collect()
    }

    /// Get number of extras
    pub fn len(&self) -> usize {
        self.extras.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.extras.is_empty()
    }
}

impl<I> Clone for ExtraRegistry<I> {
    fn clone(&self) -> Self {
        Self {
            extras: self.extras.clone(),
        }
    }
}

impl<I> Default for ExtraRegistry<I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<I> fmt::Debug for ExtraRegistry<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Builder collecting add/override/remove operations.
///
/// Operations are applied eagerly; the first invalid one is remembered and
/// reported by [`build`](Self::build).
pub struct ExtraRegistryBuilder<I> {
    extras: Vec<Extra<I>>,
    error: Option<SummaryError>,
}

impl<I> ExtraRegistryBuilder<I> {
    fn new() -> Self {
        Self {
            extras: Vec::new(),
            error: None,
        }
    }

    /// Add an extra, or replace the one with the same key in place
    pub fn extra(mut self, extra: Extra<I>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = extra.validate() {
            self.error = Some(e);
            return self;
        }
        match self.extras.iter().position(|e| e.key() == extra.key()) {
            Some(index) => self.extras[index] = extra,
            None => self.extras.push(extra),
        }
        self
    }

    /// Add several extras in order
    pub fn extras(self, extras: impl IntoIterator<Item = Extra<I>>) -> Self {
        extras.into_iter().fold(self, |builder, extra| builder.extra(extra))
    }

    /// Drop an inherited extra
    pub fn remove(mut self, key: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.extras.iter().position(|e| e.key() == key) {
            Some(index) => {
                self.extras.remove(index);
            }
            None => {
                self.error = Some(SummaryError::Configuration(format!(
                    "cannot remove unknown extra '{}'",
                    key
                )));
            }
        }
        self
    }

    /// Finish the registry, failing on the first invalid operation
    pub fn build(self) -> SummaryResult<ExtraRegistry<I>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        debug!(extras = self.extras.len(), "extra registry built");
        Ok(ExtraRegistry {
            extras: self.extras,
        })
    }
}
