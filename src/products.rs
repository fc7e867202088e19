//! Products
//!
//! Catalog records as the storefront sees them. Products are read-only to the
//! cart and wishlist, which only ever hold shared references to them.

use decimal_percentage::Percentage;
use jiff::{SignedDuration, Timestamp};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::discounts::{DiscountError, discounted_minor, percentage_from_points};

/// Number of units at or below which a product is flagged as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Days added to "now" for the delivery estimate shown on a product page.
pub const ESTIMATED_DELIVERY_DAYS: i64 = 3;

/// Errors raised while turning a catalog record into a [`Product`].
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// Price was negative or not representable in minor units.
    #[error("product {0} has an invalid price: {1}")]
    InvalidPrice(String, Decimal),

    /// Rating outside of `0..=5`.
    #[error("product {0} has an invalid rating: {1}")]
    InvalidRating(String, Decimal),

    /// Discount could not be converted.
    #[error("product {id} has an invalid discount: {source}")]
    InvalidDiscount {
        /// Product id
        id: String,

        /// Underlying discount error
        source: DiscountError,
    },

    /// Product id was blank.
    #[error("product id must not be empty")]
    MissingId,
}

/// Merchandising flags used by the storefront sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFlags {
    /// Shown in the featured section
    pub featured: bool,

    /// Recently added to the catalog
    pub new_arrival: bool,

    /// Shown in the best sellers section
    pub best_seller: bool,
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Unique product id
    pub id: String,

    /// Display name
    pub name: String,

    /// Base price before any discount
    pub price: Money<'a, Currency>,

    /// Percentage taken off the base price
    pub discount: Option<Percentage>,

    /// Units available
    pub stock: u32,

    /// Category key
    pub category: String,

    /// Merchandising flags
    pub flags: ProductFlags,

    /// Average rating, `0..=5`
    pub rating: Decimal,

    /// Selectable colours, used as cart variants
    pub colors: SmallVec<[String; 4]>,
}

impl<'a> Product<'a> {
    /// Price after the discount has been applied.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount cannot be represented in minor units.
    pub fn effective_price(&self) -> Result<Money<'a, Currency>, DiscountError> {
        let Some(discount) = &self.discount else {
            return Ok(self.price);
        };

        let minor = discounted_minor(discount, self.price.to_minor_units())?;

        Ok(Money::from_minor(minor, self.price.currency()))
    }

    /// Amount saved per unit thanks to the discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount cannot be applied.
    pub fn savings(&self) -> Result<Money<'a, Currency>, ProductError> {
        let effective = self
            .effective_price()
            .map_err(|source| ProductError::InvalidDiscount {
                id: self.id.clone(),
                source,
            })?;

        Ok(Money::from_minor(
            self.price.to_minor_units() - effective.to_minor_units(),
            self.price.currency(),
        ))
    }

    /// Whether any units can be added to a cart.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the product is in stock but at or below `threshold` units.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.in_stock() && self.stock <= threshold
    }

    /// Whether the product carries a discount.
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some()
    }
}

/// Products in the same category as `product`, excluding it, in catalog order.
pub fn related_products<'p, 'a>(
    product: &Product<'a>,
    products: &'p [Product<'a>],
    limit: usize,
) -> Vec<&'p Product<'a>> {
    products
        .iter()
        .filter(|candidate| candidate.category == product.category && candidate.id != product.id)
        .take(limit)
        .collect()
}

/// Delivery estimate shown on the product page.
///
/// # Errors
///
/// Returns an error if the estimate overflows the supported timestamp range.
pub fn estimated_delivery(now: Timestamp) -> Result<Timestamp, jiff::Error> {
    now.checked_add(SignedDuration::from_hours(ESTIMATED_DELIVERY_DAYS * 24))
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category key, matched against [`Product::category`]
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional image URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Brand id
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional logo URL
    #[serde(default)]
    pub logo: Option<String>,
}

/// A product as it arrives from the catalog, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Product id
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in major units of the catalog currency (e.g. `29.99`)
    pub price: Decimal,

    /// Discount in percentage points (e.g. `25` for 25% off)
    #[serde(default)]
    pub discount: Option<Decimal>,

    /// Units available
    #[serde(default)]
    pub stock: u32,

    /// Category key
    #[serde(default)]
    pub category: String,

    /// Featured flag
    #[serde(default)]
    pub featured: bool,

    /// New arrival flag
    #[serde(default)]
    pub new_arrival: bool,

    /// Best seller flag
    #[serde(default)]
    pub best_seller: bool,

    /// Average rating
    #[serde(default)]
    pub rating: Decimal,

    /// Selectable colours
    #[serde(default)]
    pub colors: SmallVec<[String; 4]>,
}

impl ProductRecord {
    /// Validate the record and price it in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the id is blank, the price is negative or too
    /// large, the rating is outside `0..=5`, or the discount is outside `0..=100`.
    pub fn into_product(self, currency: &'static Currency) -> Result<Product<'static>, ProductError> {
        if self.id.trim().is_empty() {
            return Err(ProductError::MissingId);
        }

        let minor_units = major_to_minor(self.price, currency)
            .ok_or_else(|| ProductError::InvalidPrice(self.id.clone(), self.price))?;

        if self.rating < Decimal::ZERO || self.rating > Decimal::from(5) {
            return Err(ProductError::InvalidRating(self.id, self.rating));
        }

        let discount = match self.discount {
            // A zero discount is how the API spells "no discount".
            Some(points) if points.is_zero() => None,
            Some(points) => Some(percentage_from_points(points).map_err(|source| {
                ProductError::InvalidDiscount {
                    id: self.id.clone(),
                    source,
                }
            })?),
            None => None,
        };

        Ok(Product {
            id: self.id,
            name: self.name,
            price: Money::from_minor(minor_units, currency),
            discount,
            stock: self.stock,
            category: self.category,
            flags: ProductFlags {
                featured: self.featured,
                new_arrival: self.new_arrival,
                best_seller: self.best_seller,
            },
            rating: self.rating,
            colors: self.colors,
        })
    }
}

/// Convert a non-negative major-unit amount into minor units of `currency`.
pub(crate) fn major_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }

    amount
        .checked_mul(Decimal::from(10_i64.checked_pow(currency.exponent)?))
        .and_then(|value| value.round_dp(0).to_i64())
}

/// Convert a money amount back into major units.
pub(crate) fn minor_to_major(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}


#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{JPY, USD};
    use testresult::TestResult;

    use super::{test_support::*, *};

    fn record(id: &str, price: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("سماعة {id}"),
            price: price.parse().unwrap_or_default(),
            discount: None,
            stock: 3,
            category: "audio".to_string(),
            featured: false,
            new_arrival: true,
            best_seller: false,
            rating: Decimal::from(4),
            colors: SmallVec::new(),
        }
    }

    #[test]
    fn effective_price_without_discount_is_price() -> TestResult {
        let product = product("p1", 1000, 5);

        assert_eq!(product.effective_price()?, Money::from_minor(1000, USD));

        Ok(())
    }

    #[test]
    fn effective_price_applies_discount() -> TestResult {
        let product = discounted("p1", 2000, 5, 50);

        assert_eq!(product.effective_price()?, Money::from_minor(1000, USD));
        assert_eq!(product.savings()?, Money::from_minor(1000, USD));

        Ok(())
    }

    #[test]
    fn low_stock_excludes_sold_out_products() {
        assert!(product("p1", 100, 5).is_low_stock(LOW_STOCK_THRESHOLD));
        assert!(!product("p2", 100, 6).is_low_stock(LOW_STOCK_THRESHOLD));
        assert!(!product("p3", 100, 0).is_low_stock(LOW_STOCK_THRESHOLD));
        assert!(!product("p3", 100, 0).in_stock());
    }

    #[test]
    fn related_products_share_category_and_exclude_self() {
        let mut other = product("p3", 100, 1);
        other.category = "other".to_string();

        let products = [
            product("p1", 100, 1),
            product("p2", 100, 1),
            other,
            product("p4", 100, 1),
            product("p5", 100, 1),
        ];

        let related = related_products(&products[0], &products, 2);
        let ids: Vec<&str> = related.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["p2", "p4"]);
    }

    #[test]
    fn estimated_delivery_is_three_days_out() -> TestResult {
        let now: Timestamp = "2026-01-01T00:00:00Z".parse()?;
        let expected: Timestamp = "2026-01-04T00:00:00Z".parse()?;

        assert_eq!(estimated_delivery(now)?, expected);

        Ok(())
    }

    #[test]
    fn record_converts_to_product() -> TestResult {
        let mut record = record("p1", "29.99");
        record.discount = Some(Decimal::from(10));

        let product = record.into_product(USD)?;

        assert_eq!(product.price, Money::from_minor(2999, USD));
        assert!(product.flags.new_arrival);
        assert!(product.is_discounted());

        Ok(())
    }

    #[test]
    fn record_with_zero_discount_has_no_discount() -> TestResult {
        let mut record = record("p1", "10");
        record.discount = Some(Decimal::ZERO);

        assert!(!record.into_product(USD)?.is_discounted());

        Ok(())
    }

    #[test]
    fn record_uses_currency_exponent() -> TestResult {
        let product = record("p1", "1500").into_product(JPY)?;

        assert_eq!(product.price.to_minor_units(), 1500);

        Ok(())
    }

    #[test]
    fn record_rejects_invalid_values() {
        assert!(matches!(
            record("p1", "-1").into_product(USD),
            Err(ProductError::InvalidPrice(..))
        ));

        let mut bad_rating = record("p1", "1");
        bad_rating.rating = Decimal::from(6);
        assert!(matches!(
            bad_rating.into_product(USD),
            Err(ProductError::InvalidRating(..))
        ));

        let mut bad_discount = record("p1", "1");
        bad_discount.discount = Some(Decimal::from(150));
        assert!(matches!(
            bad_discount.into_product(USD),
            Err(ProductError::InvalidDiscount { .. })
        ));

        assert!(matches!(
            record(" ", "1").into_product(USD),
            Err(ProductError::MissingId)
        ));
    }

    #[test]
    fn minor_to_major_round_trips_price() {
        let product = product("p1", 2999, 1);

        assert_eq!(minor_to_major(&product.price), Decimal::new(2999, 2));
    }
}
