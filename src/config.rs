//! Store configuration
//!
//! Tunables for a storefront, read from YAML. Every field has a default so an
//! empty file, or no file at all, yields the stock configuration.

use std::{fs, path::Path, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Findable, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, percentage_from_points},
    display::{IQD_PER_USD, IQD_SYMBOL, LocalCurrency},
    pricing::{FREE_SHIPPING_THRESHOLD_MINOR, PricingPolicy, SHIPPING_FEE_MINOR},
    products::{LOW_STOCK_THRESHOLD, major_to_minor},
    search::LATEST_PRODUCTS,
};

/// Related products shown on a product page.
pub const RELATED_PRODUCTS: usize = 4;

/// Products per page of search results.
pub const PAGE_SIZE: usize = 7;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),

    /// Currency code not recognised
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage format
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Percentage outside 0..=100%
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Amount cannot be represented in the currency's minor units
    #[error("invalid amount for {field}: {amount}")]
    InvalidAmount {
        /// Config field name
        field: &'static str,
        /// Configured amount
        amount: Decimal,
    },
}

/// Shipping and tax settings, amounts in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingConfig {
    /// Subtotal from which shipping is free
    pub free_shipping_threshold: Decimal,

    /// Flat shipping fee below the threshold
    pub shipping_fee: Decimal,

    /// Tax rate, e.g. `"7%"` or `"0.07"`
    pub tax_rate: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(FREE_SHIPPING_THRESHOLD_MINOR, 2),
            shipping_fee: Decimal::new(SHIPPING_FEE_MINOR, 2),
            tax_rate: "7%".to_string(),
        }
    }
}

/// Display currency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Display units per major unit of the store currency
    pub exchange_rate: Decimal,

    /// Text placed after display amounts
    pub symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            exchange_rate: Decimal::from(IQD_PER_USD),
            symbol: IQD_SYMBOL.to_string(),
        }
    }
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// ISO code of the currency prices are stored in
    pub currency: String,

    /// Shipping and tax
    pub pricing: PricingConfig,

    /// Display currency
    pub display: DisplayConfig,

    /// Stock level at or below which a product shows a low-stock warning
    pub low_stock_threshold: u32,

    /// Related products shown on a product page
    pub related_products: usize,

    /// Products in the latest products section
    pub latest_products: usize,

    /// Search results per page
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            pricing: PricingConfig::default(),
            display: DisplayConfig::default(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            related_products: RELATED_PRODUCTS,
            latest_products: LATEST_PRODUCTS,
            page_size: PAGE_SIZE,
        }
    }
}

impl FromStr for StoreConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(s)?)
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not an ISO currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Currency::find(self.currency.trim())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Shipping and tax policy in the configured currency.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the currency, an amount or the tax rate is invalid.
    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        let currency = self.currency()?;
        let pricing = &self.pricing;

        Ok(PricingPolicy {
            free_shipping_threshold: minor_amount(
                "freeShippingThreshold",
                pricing.free_shipping_threshold,
                currency,
            )?,
            shipping_fee: minor_amount("shippingFee", pricing.shipping_fee, currency)?,
            tax_rate: parse_percentage(&pricing.tax_rate)?,
        })
    }

    /// Display currency conversion.
    pub fn local_currency(&self) -> LocalCurrency {
        LocalCurrency {
            rate: self.display.exchange_rate,
            symbol: self.display.symbol.clone(),
        }
    }
}

fn minor_amount(
    field: &'static str,
    amount: Decimal,
    currency: &Currency,
) -> Result<i64, ConfigError> {
    major_to_minor(amount, currency)
        .filter(|minor| *minor >= 0)
        .ok_or(ConfigError::InvalidAmount { field, amount })
}

/// Parse a percentage written either as `"7%"` or as a fraction `"0.07"`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the string is not a number or lies outside 0..=100%.
pub fn parse_percentage(s: &str) -> Result<decimal_percentage::Percentage, ConfigError> {
    let trimmed = s.trim();

    let points = if let Some(percent_str) = trimmed.strip_suffix('%') {
        Decimal::from_str(percent_str.trim())
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
    } else {
        Decimal::from_str(trimmed)
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| ConfigError::InvalidPercentage(s.to_string()))?
    };

    Ok(percentage_from_points(points)?)
}
