//! Receipt
//!
//! Terminal rendering of a cart and its order summary.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    display::{DisplayError, LocalCurrency},
    pricing::{OrderSummary, PricingError, PricingPolicy},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Local currency conversion failed.
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name
    pub name: String,

    /// Variant tag
    pub variant: Option<String>,

    /// Units
    pub quantity: u32,

    /// Base unit price
    pub base_price: Money<'a, Currency>,

    /// Unit price after discount
    pub unit_price: Money<'a, Currency>,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,
}

/// Cart lines plus the order summary.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,
    summary: OrderSummary<'a>,
    local_currency: Option<LocalCurrency>,
}

impl<'a> Receipt<'a> {
    /// Price every line of `cart` and summarise it under `policy`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if any amount cannot be calculated.
    pub fn from_cart(cart: &Cart<'a>, policy: &PricingPolicy) -> Result<Self, ReceiptError> {
        let lines = cart
            .iter()
            .map(|entry| {
                Ok(ReceiptLine {
                    name: entry.product().name.clone(),
                    variant: entry.variant().map(str::to_string),
                    quantity: entry.quantity(),
                    base_price: entry.product().price,
                    unit_price: entry
                        .product()
                        .effective_price()
                        .map_err(PricingError::from)?,
                    line_total: entry.line_total()?,
                })
            })
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        let summary = policy.summarize(cart.subtotal()?)?;

        Ok(Self {
            lines,
            summary,
            local_currency: None,
        })
    }

    /// Also show the grand total converted into `local_currency`.
    #[must_use]
    pub fn with_local_currency(mut self, local_currency: LocalCurrency) -> Self {
        self.local_currency = Some(local_currency);
        self
    }

    /// Rendered lines in cart order.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Order summary figures.
    pub fn summary(&self) -> &OrderSummary<'a> {
        &self.summary
    }

    /// Writes the receipt as a table followed by the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Variant", "Qty", "Unit Price", "Line Total"]);

        for line in &self.lines {
            let unit_price = if line.unit_price == line.base_price {
                line.unit_price.to_string()
            } else {
                format!("{} (was {})", line.unit_price, line.base_price)
            };

            builder.push_record([
                line.name.clone(),
                line.variant.clone().unwrap_or_else(|| "-".to_string()),
                line.quantity.to_string(),
                unit_price,
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let summary = &self.summary;

        let shipping = if summary.free_shipping() {
            "Free".to_string()
        } else {
            summary.shipping.to_string()
        };

        let mut rows = vec![
            ("Subtotal:", summary.subtotal.to_string()),
            ("Shipping:", shipping),
            ("Tax:", summary.tax.to_string()),
            ("Total:", summary.total.to_string()),
        ];

        if let Some(local) = &self.local_currency {
            rows.push(("", local.format(&summary.total)?));
        }

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in &rows {
            let pad = value_width.saturating_sub(value.chars().count());

            writeln!(out, " {label:>label_width$}  {}{value}", " ".repeat(pad))
                .map_err(|_err| ReceiptError::IO)?;
        }

        if !summary.free_shipping() {
            writeln!(
                out,
                "\n Spend {} more for free shipping",
                summary.remaining_for_free_shipping
            )
            .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}
