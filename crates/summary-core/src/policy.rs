//! # Summary Policy
//!
//! Rounding for the amounts a summary synthesizes (voucher discounts,
//! percentage extras) and negative-total handling for `amount_due`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounding mode for monetary aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.125 → 0.13, -0.125 → -0.13
    HalfUp,
    /// Banker's rounding: 0.125 → 0.12
    HalfEven,
    /// Truncate toward zero
    Down,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
        }
    }
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::HalfUp
    }
}

/// Rounding and clamping rules for a summary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPolicy {
    /// Decimal places kept in voucher discounts and percentage extras
    pub decimal_places: u32,

    /// How to round to `decimal_places`
    pub rounding: RoundingMode,

    /// Whether `amount_due` clamps a negative total to zero
    pub prevent_negative: bool,
}

impl SummaryPolicy {
    /// Round a value according to this policy
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimal_places, self.rounding.strategy())
    }

    /// Builder: set decimal places
    pub fn with_decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    /// Builder: set rounding mode
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// Builder: set negative-total clamping
    pub fn with_prevent_negative(mut self, prevent: bool) -> Self {
        self.prevent_negative = prevent;
        self
    }
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            rounding: RoundingMode::HalfUp,
            prevent_negative: true,
        }
    }
}
