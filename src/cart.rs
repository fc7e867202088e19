//! Cart
//!
//! An explicitly owned cart store. Entries borrow their products from the
//! catalog; the cart never changes product data. Every mutation reports what
//! it did as a [`CartEvent`], or `None` when the request was a no-op.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{catalog::Catalog, pricing::PricingError, products::Product};

/// Change applied to a cart by a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new entry was inserted.
    Added {
        /// Product id
        product_id: String,
        /// Variant tag
        variant: Option<String>,
        /// Stored quantity
        quantity: u32,
    },

    /// An existing entry's quantity changed.
    QuantityChanged {
        /// Product id
        product_id: String,
        /// Variant tag
        variant: Option<String>,
        /// Quantity before the change
        from: u32,
        /// Quantity after the change
        to: u32,
    },

    /// An entry was removed.
    Removed {
        /// Product id
        product_id: String,
        /// Variant tag
        variant: Option<String>,
    },

    /// All entries were removed.
    Cleared {
        /// Number of entries removed
        entries: usize,
    },
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry<'a> {
    product: &'a Product<'a>,
    quantity: u32,
    variant: Option<String>,
}

impl<'a> CartEntry<'a> {
    /// The referenced product.
    pub fn product(&self) -> &'a Product<'a> {
        self.product
    }

    /// Units of the product in the cart.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Variant (colour) tag, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Effective unit price multiplied by the quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the discount or multiplication cannot be represented.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        let unit = self.product.effective_price()?;

        let minor = unit
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(minor, unit.currency()))
    }

    fn matches(&self, product_id: &str, variant: Option<&str>) -> bool {
        self.product.id == product_id && self.variant.as_deref() == variant
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    entries: Vec<CartEntry<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            entries: Vec::new(),
            currency,
        }
    }

    /// Add `quantity` units of `product` as `variant`.
    ///
    /// Merges into an existing entry for the same product and variant. The stored
    /// quantity is clamped to `1..=stock`; sold-out products and products priced in
    /// another currency are ignored.
    pub fn add(
        &mut self,
        product: &'a Product<'a>,
        quantity: u32,
        variant: Option<&str>,
    ) -> Option<CartEvent> {
        if !product.in_stock() {
            debug!(product_id = %product.id, "ignoring add of sold out product");
            return None;
        }

        if product.price.currency() != self.currency {
            warn!(
                product_id = %product.id,
                product_currency = product.price.currency().iso_alpha_code,
                cart_currency = self.currency.iso_alpha_code,
                "ignoring add of product priced in another currency"
            );
            return None;
        }

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.matches(&product.id, variant))
        {
            let from = entry.quantity;
            let to = from.saturating_add(quantity).min(product.stock);

            if to == from {
                return None;
            }

            entry.quantity = to;
            debug!(product_id = %product.id, from, to, "merged cart entry");

            return Some(CartEvent::QuantityChanged {
                product_id: product.id.clone(),
                variant: variant.map(str::to_string),
                from,
                to,
            });
        }

        let quantity = quantity.clamp(1, product.stock);

        self.entries.push(CartEntry {
            product,
            quantity,
            variant: variant.map(str::to_string),
        });

        debug!(product_id = %product.id, quantity, "added cart entry");

        Some(CartEvent::Added {
            product_id: product.id.clone(),
            variant: variant.map(str::to_string),
            quantity,
        })
    }

    /// Set the quantity of an entry.
    ///
    /// Zero is ignored; quantities above the product's stock are clamped to it.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        variant: Option<&str>,
        quantity: u32,
    ) -> Option<CartEvent> {
        if quantity < 1 {
            return None;
        }

        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.matches(product_id, variant))?;

        let from = entry.quantity;
        let to = quantity.min(entry.product.stock);

        if to == from {
            return None;
        }

        entry.quantity = to;
        debug!(product_id, from, to, "updated cart quantity");

        Some(CartEvent::QuantityChanged {
            product_id: product_id.to_string(),
            variant: variant.map(str::to_string),
            from,
            to,
        })
    }

    /// Remove the entry for `product_id` and `variant`, if present.
    pub fn remove(&mut self, product_id: &str, variant: Option<&str>) -> Option<CartEvent> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.matches(product_id, variant))?;

        self.entries.remove(index);
        debug!(product_id, "removed cart entry");

        Some(CartEvent::Removed {
            product_id: product_id.to_string(),
            variant: variant.map(str::to_string),
        })
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Option<CartEvent> {
        if self.entries.is_empty() {
            return None;
        }

        let entries = self.entries.len();
        self.entries.clear();
        debug!(entries, "cleared cart");

        Some(CartEvent::Cleared { entries })
    }

    /// Sum of every entry's effective price times its quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.entries
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, entry| {
                Ok(acc.add(entry.line_total()?)?)
            })
    }

    /// Look up the entry for `product_id` and `variant`.
    pub fn get(&self, product_id: &str, variant: Option<&str>) -> Option<&CartEntry<'a>> {
        self.entries
            .iter()
            .find(|entry| entry.matches(product_id, variant))
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartEntry<'a>> {
        self.entries.iter()
    }

    /// Get the number of entries in the cart.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total units across all entries.
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |count, entry| count.saturating_add(entry.quantity))
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Capture the cart as plain data for persistence.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            entries: self
                .entries
                .iter()
                .map(|entry| CartSnapshotEntry {
                    product_id: entry.product.id.clone(),
                    quantity: entry.quantity,
                    variant: entry.variant.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a cart from a snapshot against the current catalog.
    ///
    /// Entries are re-added, so quantities are clamped to today's stock. Entries
    /// for products no longer in the catalog are skipped.
    pub fn restore(snapshot: &CartSnapshot, catalog: &'a Catalog) -> Self {
        let mut cart = Cart::new(catalog.currency());

        for entry in &snapshot.entries {
            let Some(product) = catalog.product(&entry.product_id) else {
                warn!(product_id = %entry.product_id, "skipping unknown product in saved cart");
                continue;
            };

            cart.add(product, entry.quantity, entry.variant.as_deref());
        }

        cart
    }
}

/// Persisted form of a [`Cart`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Entries in cart order
    pub entries: Vec<CartSnapshotEntry>,
}

/// Persisted form of a [`CartEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshotEntry {
    /// Product id
    pub product_id: String,

    /// Quantity
    pub quantity: u32,

    /// Variant tag
    #[serde(default)]
    pub variant: Option<String>,
}
