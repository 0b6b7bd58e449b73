//! Conversion between decimal prices and provider minor units.
//!
//! Prices are held as `Decimal` with two fractional digits. Payment providers
//! speak integer minor units (cents). Both directions go through this module so
//! the checkout amount and the settled webhook amount round identically.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::foundation::ValidationError;

/// Number of fractional digits in a stored amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Rounds an amount to two decimal places, half away from zero.
pub fn normalize_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal price to minor units, rounding half-up.
///
/// `49.99` becomes `4999`, `0.005` becomes `1`.
pub fn to_minor_units(price: Decimal) -> Result<i64, ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::negative("price", price));
    }
    (normalize_amount(price) * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| ValidationError::invalid_format("price", "amount out of range"))
}

/// Converts minor units back to a two-place decimal amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, AMOUNT_SCALE)
}
