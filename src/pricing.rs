//! Pricing
//!
//! Order totals derived from a cart subtotal: shipping fee, tax line and grand
//! total. These are pure functions of the subtotal and a [`PricingPolicy`].

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::discounts::{DiscountError, percent_of_minor};

/// Subtotal, in minor units, from which shipping is free.
pub const FREE_SHIPPING_THRESHOLD_MINOR: i64 = 50_00;

/// Flat shipping fee, in minor units, below the free-shipping threshold.
pub const SHIPPING_FEE_MINOR: i64 = 5_00;

/// Tax rate applied to the subtotal.
pub const TAX_RATE: &str = "0.07";

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Discount or tax percentage could not be applied.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// An amount overflowed its minor-unit representation.
    #[error("amount overflowed")]
    Overflow,
}

/// Constants governing shipping and tax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Subtotal (minor units) at or above which shipping is free
    pub free_shipping_threshold: i64,

    /// Flat fee (minor units) charged below the threshold
    pub shipping_fee: i64,

    /// Tax charged on the subtotal
    pub tax_rate: Percentage,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: FREE_SHIPPING_THRESHOLD_MINOR,
            shipping_fee: SHIPPING_FEE_MINOR,
            tax_rate: Percentage::try_from(TAX_RATE).unwrap_or_else(|_err| Percentage::from(0.07)),
        }
    }
}

impl PricingPolicy {
    /// Shipping fee for `subtotal`: zero once the free-shipping threshold is reached.
    pub fn shipping_fee<'a>(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        let fee = if subtotal.to_minor_units() >= self.free_shipping_threshold {
            0
        } else {
            self.shipping_fee
        };

        Money::from_minor(fee, subtotal.currency())
    }

    /// Tax charged on `subtotal`, rounded to whole minor units.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the percentage calculation overflows.
    pub fn tax_line<'a>(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let tax = percent_of_minor(&self.tax_rate, subtotal.to_minor_units())?;

        Ok(Money::from_minor(tax, subtotal.currency()))
    }

    /// Subtotal plus shipping fee plus tax.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the tax cannot be calculated or the sum fails.
    pub fn grand_total<'a>(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.summarize(*subtotal)?.total)
    }

    /// How much more the customer must spend to get free shipping.
    pub fn remaining_for_free_shipping<'a>(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Money<'a, Currency> {
        let remaining = self
            .free_shipping_threshold
            .saturating_sub(subtotal.to_minor_units())
            .max(0);

        Money::from_minor(remaining, subtotal.currency())
    }

    /// Every figure of the order summary for `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the tax cannot be calculated or the sum fails.
    pub fn summarize<'a>(
        &self,
        subtotal: Money<'a, Currency>,
    ) -> Result<OrderSummary<'a>, PricingError> {
        let shipping = self.shipping_fee(&subtotal);
        let tax = self.tax_line(&subtotal)?;
        let total = subtotal.add(shipping)?.add(tax)?;

        Ok(OrderSummary {
            subtotal,
            shipping,
            tax,
            total,
            remaining_for_free_shipping: self.remaining_for_free_shipping(&subtotal),
        })
    }
}

/// Figures shown in the order summary panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary<'a> {
    /// Cart subtotal
    pub subtotal: Money<'a, Currency>,

    /// Shipping fee (zero when free)
    pub shipping: Money<'a, Currency>,

    /// Tax line
    pub tax: Money<'a, Currency>,

    /// Grand total
    pub total: Money<'a, Currency>,

    /// Amount left to spend before shipping becomes free
    pub remaining_for_free_shipping: Money<'a, Currency>,
}

impl OrderSummary<'_> {
    /// Whether shipping is free for this order.
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}
