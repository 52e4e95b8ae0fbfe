//! Conversions between domain amounts and persisted minor units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Number of decimal places persisted for every amount.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Converts an amount to minor units, or `None` when it carries more precision
/// than the store keeps or does not fit in an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount.round_dp(MINOR_UNIT_SCALE) != amount {
        return None;
    }
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Converts persisted minor units back into an amount.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}
