//! Money rounding helpers.
//!
//! Every monetary figure the engine emits is rounded exactly once with
//! the same rule: two decimal places, half-up (midpoint away from zero).
//! Totals are plain sums of already-rounded components and are never
//! re-rounded.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary value to two decimal places, half-up.
///
/// # Example
///
/// ```
/// use paye_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("48.345").unwrap();
/// assert_eq!(round_money(value), Decimal::from_str("48.35").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors a value at zero.
///
/// Deductions never go negative: a calculation that would produce a
/// negative figure reports zero instead.
pub fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// The portion of `value` that falls between `lower` and `upper`.
///
/// Used for banded charges: earnings below `lower` contribute nothing,
/// earnings above `upper` are handled by the next band up.
pub fn portion_between(value: Decimal, lower: Decimal, upper: Decimal) -> Decimal {
    floor_zero(value.min(upper) - lower)
}

/// The portion of `value` above `threshold`.
pub fn portion_above(value: Decimal, threshold: Decimal) -> Decimal {
    floor_zero(value - threshold)
}
