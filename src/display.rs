//! Local currency display
//!
//! Prices are stored and summed in the catalog currency. The storefront shows
//! them in Iraqi dinars using a fixed exchange rate; conversion happens here and
//! only here, never inside cart or pricing arithmetic.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::minor_to_major;

/// Dinars per US dollar used for display.
pub const IQD_PER_USD: i64 = 1300;

/// Suffix shown after dinar amounts.
pub const IQD_SYMBOL: &str = "د.ع";

/// Errors raised while converting a display price.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    /// Converted amount did not fit.
    #[error("converted amount overflowed")]
    Overflow,
}

/// Fixed-rate conversion into a display currency with whole units.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCurrency {
    /// Display units per major unit of the catalog currency
    pub rate: Decimal,

    /// Text placed after the amount
    pub symbol: String,
}

impl Default for LocalCurrency {
    fn default() -> Self {
        Self {
            rate: Decimal::from(IQD_PER_USD),
            symbol: IQD_SYMBOL.to_string(),
        }
    }
}

impl LocalCurrency {
    /// Convert `price` into whole display units, rounding half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Overflow`] if the converted amount does not fit.
    pub fn convert(&self, price: &Money<'_, Currency>) -> Result<i64, DisplayError> {
        minor_to_major(price)
            .checked_mul(self.rate)
            .ok_or(DisplayError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(DisplayError::Overflow)
    }

    /// Format `price` for display, e.g. `"13,000 د.ع"`.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Overflow`] if the converted amount does not fit.
    pub fn format(&self, price: &Money<'_, Currency>) -> Result<String, DisplayError> {
        let amount = self.convert(price)?;

        Ok(format!("{} {}", group_thousands(amount), self.symbol))
    }
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        grouped.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
