//! # Resolvable Fields
//!
//! Every attribute of an extra is either a literal or a function of the
//! bound instance. [`Field`] is that tagged union, and [`Field::resolve`] is
//! the one place where the tag is dispatched on.

use crate::error::BoxError;
use std::fmt;
use std::sync::Arc;

/// Function computing a field value from the bound instance.
///
/// Resolvers only get a shared reference; they cannot mutate the instance.
pub type ResolverFn<I, T> = Arc<dyn Fn(&I) -> Result<T, BoxError> + Send + Sync>;

/// A value that is either fixed or computed from the instance
pub enum Field<I, T> {
    /// Fixed value, returned as-is
    Literal(T),
    /// Computed from the instance on resolution
    Computed(ResolverFn<I, T>),
}

impl<I, T: Clone> Field<I, T> {
    /// Create a literal field
    pub fn literal(value: impl Into<T>) -> Self {
        Field::Literal(value.into())
    }

    /// Create a computed field from an infallible resolver
    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&I) -> T + Send + Sync + 'static,
    {
        Field::Computed(Arc::new(move |instance| Ok(resolver(instance))))
    }

    /// Create a computed field from a resolver that may fail
    pub fn try_from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&I) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Field::Computed(Arc::new(resolver))
    }

    /// Resolve against an instance
    pub fn resolve(&self, instance: &I) -> Result<T, BoxError> {
        match self {
            Field::Literal(value) => Ok(value.clone()),
            Field::Computed(resolver) => resolver(instance),
        }
    }

    /// The literal value, if this field does not depend on the instance
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Field::Literal(value) => Some(value),
            Field::Computed(_) => None,
        }
    }

    /// Check if this field needs an instance to resolve
    pub fn is_computed(&self) -> bool {
        matches!(self, Field::Computed(_))
    }
}

impl<I, T: Clone> Clone for Field<I, T> {
    fn clone(&self) -> Self {
        match self {
            Field::Literal(value) => Field::Literal(value.clone()),
            Field::Computed(resolver) => Field::Computed(Arc::clone(resolver)),
        }
    }
}

impl<I, T: fmt::Debug> fmt::Debug for Field<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Field::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Conversion into a [`Field`], so setters accept plain values or fields
pub trait IntoField<I, T> {
    fn into_field(self) -> Field<I, T>;
}

impl<I, T> IntoField<I, T> for Field<I, T> {
    fn into_field(self) -> Field<I, T> {
        self
    }
}

impl<I> IntoField<I, String> for &str {
    fn into_field(self) -> Field<I, String> {
        Field::Literal(self.to_string())
    }
}

impl<I> IntoField<I, String> for String {
    fn into_field(self) -> Field<I, String> {
        Field::Literal(self)
    }
}

impl<I> IntoField<I, rust_decimal::Decimal> for rust_decimal::Decimal {
    fn into_field(self) -> Field<I, rust_decimal::Decimal> {
        Field::Literal(self)
    }
}

impl<I> IntoField<I, bool> for bool {
    fn into_field(self) -> Field<I, bool> {
        Field::Literal(self)
    }
}

/// Default display name for a key: `my_commission` becomes `my commission`
pub fn humanize(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
