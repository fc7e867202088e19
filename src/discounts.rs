//! Discount utilities
//!
//! Percentage maths over minor units, shared by product pricing and the tax line.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Discount percentage points outside of `0..=100`.
    #[error("discount of {0}% is outside of 0-100")]
    OutOfRange(Decimal),
}

/// Calculate the amount in minor units that `percent` represents of `minor`.
///
/// Rounds half away from zero to whole minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Price in minor units after taking `percent` off, never below zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn discounted_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let off = percent_of_minor(percent, minor)?;

    Ok(minor.saturating_sub(off).max(0))
}

/// Convert storefront discount points (e.g. `25` for 25% off) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`DiscountError::OutOfRange`] when `points` is not within `0..=100`, and
/// [`DiscountError::PercentConversion`] when it cannot be represented.
pub fn percentage_from_points(points: Decimal) -> Result<Percentage, DiscountError> {
    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return Err(DiscountError::OutOfRange(points));
    }

    let fraction = (points / Decimal::ONE_HUNDRED).normalize().to_string();

    Percentage::try_from(fraction.as_str()).map_err(|_err| DiscountError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use decimal_percentage::Percentage;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        // 5% of 0.50 is 2.5 cents
        let percent = Percentage::try_from("0.05")?;

        assert_eq!(percent_of_minor(&percent, 50)?, 3);

        Ok(())
    }

    #[test]
    fn discounted_minor_takes_percentage_off() -> TestResult {
        let percent = Percentage::from(0.5);

        assert_eq!(discounted_minor(&percent, 2000)?, 1000);

        Ok(())
    }

    #[test]
    fn discounted_minor_never_goes_negative() -> TestResult {
        let percent = Percentage::from(1.0);

        assert_eq!(discounted_minor(&percent, 999)?, 0);

        Ok(())
    }

    #[test]
    fn percentage_from_points_converts_to_fraction() -> TestResult {
        let percent = percentage_from_points(Decimal::from(25))?;

        assert_eq!(percent, Percentage::try_from("0.25")?);

        Ok(())
    }

    #[test]
    fn percentage_from_points_rejects_out_of_range() {
        assert!(matches!(
            percentage_from_points(Decimal::from(101)),
            Err(DiscountError::OutOfRange(_))
        ));
        assert!(matches!(
            percentage_from_points(Decimal::from(-1)),
            Err(DiscountError::OutOfRange(_))
        ));
    }
}
