//! Decimal precision rules shared by the ledgers and calculators.
//!
//! Amounts are rounded once, when a value is persisted. Everything before that
//! point works on full-precision decimals.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Stored precision for money columns
pub const MONEY_DP: u32 = 2;
/// Stored precision for quantity columns
pub const QUANTITY_DP: u32 = 3;
/// Largest accepted price or amount (ten digits, two of them decimals)
pub const MAX_MONEY: Decimal = dec!(99999999.99);
/// Largest accepted quantity (ten digits, three of them decimals)
pub const MAX_QUANTITY: Decimal = dec!(9999999.999);

/// Rounds to cents, half to even.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Rounds to the stored quantity precision, half to even.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Smallest integer not below `value`, as a count.
///
/// # Errors
/// Returns `Error::Validation` if the result does not fit in an `i64`.
pub fn ceil_count(value: Decimal) -> Result<i64> {
    i64::try_from(value.ceil())
        .map_err(|_| Error::validation(format!("{value} is out of range for a count")))
}

fn positive(field: &str, value: Decimal, dp: u32, max: Decimal) -> Result<Decimal> {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    if rounded <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "{field} must be greater than zero (got {value})"
        )));
    }
    at_most(field, rounded, max)
}

fn at_most(field: &str, value: Decimal, max: Decimal) -> Result<Decimal> {
    if value > max {
        return Err(Error::validation(format!(
            "{field} must be at most {max} (got {value})"
        )));
    }
    Ok(value)
}

/// Normalizes `value` to cents; it must be above zero and at most [`MAX_MONEY`].
pub(crate) fn positive_money(field: &str, value: Decimal) -> Result<Decimal> {
    positive(field, value, MONEY_DP, MAX_MONEY)
}

/// Normalizes `value` to the quantity precision; it must be above zero and at
/// most [`MAX_QUANTITY`].
pub(crate) fn positive_quantity(field: &str, value: Decimal) -> Result<Decimal> {
    positive(field, value, QUANTITY_DP, MAX_QUANTITY)
}

/// Normalizes `value` to cents and requires it to be within `0..=MAX_MONEY`.
pub(crate) fn non_negative_money(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(Error::validation(format!(
            "{field} cannot be negative (got {value})"
        )));
    }
    at_most(field, round_money(value), MAX_MONEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_even() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.34));
        assert_eq!(round_money(dec!(2.355)), dec!(2.36));
        assert_eq!(round_money(dec!(10)), dec!(10.00));
    }

    #[test]
    fn test_ceil_count() -> Result<()> {
        assert_eq!(ceil_count(dec!(3.0001))?, 4);
        assert_eq!(ceil_count(dec!(4))?, 4);
        Ok(())
    }

    #[test]
    fn test_positive_rejects_values_that_round_to_zero() {
        assert!(matches!(
            positive_money("unit_price", dec!(0.004)),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            positive_quantity("quantity", dec!(-1)),
            Err(Error::Validation { .. })
        ));
        assert!(positive_quantity("quantity", dec!(0.001)).is_ok());
    }

    #[test]
    fn test_positive_rejects_values_past_column_width() {
        assert!(positive_money("unit_price", MAX_MONEY).is_ok());
        assert!(matches!(
            positive_money("unit_price", dec!(100000000)),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            positive_quantity("quantity", dec!(100000000000000000000)),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_non_negative_money() {
        assert!(non_negative_money("discount_amount", dec!(-0.01)).is_err());
        assert!(non_negative_money("discount_amount", dec!(100000000)).is_err());
        assert!(matches!(
            non_negative_money("discount_amount", dec!(0)),
            Ok(v) if v == Decimal::ZERO
        ));
    }
}
