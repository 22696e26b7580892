//! # Voucher Adapter
//!
//! Turns vouchers attached to an instance into discount extras. Voucher
//! discounts are kept apart from declared extras and summed into
//! `vouchers_total`.
//!
//! Several vouchers stack additively: each one takes its percentage of the
//! undiscounted items total, and the discounts are summed.

use crate::cart::{CartLike, Voucher};
use crate::error::{BoxError, SummaryResult};
use crate::extra::ResolvedExtra;
use crate::money;
use crate::policy::SummaryPolicy;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Produces discount extras for the vouchers of an instance
pub trait VoucherAdapter<I>: Send + Sync {
    /// Discounts in voucher order; amounts are negative or zero
    fn discounts(
        &self,
        instance: &I,
        items_total: Decimal,
        policy: &SummaryPolicy,
    ) -> Result<Vec<ResolvedExtra>, BoxError>;
}

/// Type alias for a shared voucher adapter (dynamic dispatch)
pub type BoxedVoucherAdapter<I> = Arc<dyn VoucherAdapter<I>>;

/// Percent-off vouchers for any [`CartLike`] record
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentVoucherAdapter;

impl PercentVoucherAdapter {
    /// Discount line for a single voucher, rounded with the policy
    pub fn discount(
        voucher: &Voucher,
        items_total: Decimal,
        policy: &SummaryPolicy,
    ) -> SummaryResult<ResolvedExtra> {
        let key = format!("voucher_{}", voucher.code);
        let off = money::percent_of(items_total, voucher.percent)
            .ok_or_else(|| money::overflow(format!("{}.amount", key)))?;
        Ok(ResolvedExtra {
            verbose_name: format!("Voucher {}", voucher.code),
            description: Some(format!("{}% off", voucher.percent.normalize())),
            amount: -policy.round(off),
            included: false,
            key,
        })
    }
}

impl<I: CartLike> VoucherAdapter<I> for PercentVoucherAdapter {
    fn discounts(
        &self,
        instance: &I,
        items_total: Decimal,
        policy: &SummaryPolicy,
    ) -> Result<Vec<ResolvedExtra>, BoxError> {
        instance
            .vouchers()
            .iter()
            .map(|voucher| -> Result<ResolvedExtra, BoxError> {
                if voucher.percent.is_sign_negative() {
                    return Err(format!(
                        "voucher {} has negative percent {}",
                        voucher.code, voucher.percent
                    )
                    .into());
                }
                Ok(Self::discount(voucher, items_total, policy)?)
            })
            .collect()
    }
}

/// Sum of voucher discount amounts
pub fn vouchers_total(discounts: &[ResolvedExtra]) -> SummaryResult<Decimal> {
    money::checked_sum(discounts.iter().map(|d| d.amount))
        .ok_or_else(|| money::overflow("vouchers_total"))
}
