//! # Money Arithmetic
//!
//! Overflow-checked `Decimal` helpers used by every total in the engine,
//! plus the input limits request handlers validate against.
//!
//! `Decimal` operators panic on overflow. Totals are built from caller data,
//! so all sums and products go through the `checked_*` variants and overflow
//! surfaces as [`SummaryError::Computation`].

use crate::error::SummaryError;
use rust_decimal::Decimal;

/// Maximum accepted unit price (1,000,000)
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum accepted quantity per line
pub const MAX_QUANTITY: u32 = 9999;

/// Maximum accepted voucher percentage
pub const MAX_PERCENT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// `unit_price * quantity`, or `None` on overflow
pub fn line_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}

/// Sum of `values`, or `None` on overflow
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

/// `base * percent / 100`, unrounded, or `None` on overflow
pub fn percent_of(base: Decimal, percent: Decimal) -> Option<Decimal> {
    base.checked_mul(percent)?.checked_div(Decimal::ONE_HUNDRED)
}

/// Computation error for an overflowing `target`
pub fn overflow(target: impl Into<String>) -> SummaryError {
    SummaryError::computation(target, "decimal overflow".into())
}
