//! Wishlist
//!
//! Products a customer saved for later. Like the cart, the wishlist is an owned
//! store that borrows its products from the catalog and reports each change as
//! a [`WishlistEvent`]. Saving is idempotent and `added_at` is fixed on insert.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{catalog::Catalog, products::Product};

/// Change applied to a wishlist by a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistEvent {
    /// A product was saved.
    Added {
        /// Product id
        product_id: String,
        /// When it was saved
        added_at: Timestamp,
    },

    /// A product was removed.
    Removed {
        /// Product id
        product_id: String,
    },

    /// All entries were removed.
    Cleared {
        /// Number of entries removed
        entries: usize,
    },
}

/// A saved product.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry<'a> {
    product: &'a Product<'a>,
    added_at: Timestamp,
}

impl<'a> WishlistEntry<'a> {
    /// The saved product.
    pub fn product(&self) -> &'a Product<'a> {
        self.product
    }

    /// When the product was saved. Never changes after insertion.
    pub fn added_at(&self) -> Timestamp {
        self.added_at
    }
}

/// Wishlist
#[derive(Debug, Clone, Default)]
pub struct Wishlist<'a> {
    entries: Vec<WishlistEntry<'a>>,
}

impl<'a> Wishlist<'a> {
    /// Create an empty wishlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `product` now, unless it is already saved.
    pub fn add(&mut self, product: &'a Product<'a>) -> Option<WishlistEvent> {
        self.add_at(product, Timestamp::now())
    }

    /// Save `product` as of `added_at`, unless it is already saved.
    pub fn add_at(&mut self, product: &'a Product<'a>, added_at: Timestamp) -> Option<WishlistEvent> {
        if self.contains(&product.id) {
            return None;
        }

        self.entries.push(WishlistEntry { product, added_at });
        debug!(product_id = %product.id, "added wishlist entry");

        Some(WishlistEvent::Added {
            product_id: product.id.clone(),
            added_at,
        })
    }

    /// Remove the entry for `product_id`, if present.
    pub fn remove(&mut self, product_id: &str) -> Option<WishlistEvent> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.product.id == product_id)?;

        self.entries.remove(index);
        debug!(product_id, "removed wishlist entry");

        Some(WishlistEvent::Removed {
            product_id: product_id.to_string(),
        })
    }

    /// Remove `product` if saved, otherwise save it now.
    pub fn toggle(&mut self, product: &'a Product<'a>) -> Option<WishlistEvent> {
        if self.contains(&product.id) {
            self.remove(&product.id)
        } else {
            self.add(product)
        }
    }

    /// Whether `product_id` is saved.
    pub fn contains(&self, product_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.product.id == product_id)
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Option<WishlistEvent> {
        if self.entries.is_empty() {
            return None;
        }

        let entries = self.entries.len();
        self.entries.clear();
        debug!(entries, "cleared wishlist");

        Some(WishlistEvent::Cleared { entries })
    }

    /// Iterate over the entries in the order they were saved.
    pub fn iter(&self) -> impl Iterator<Item = &WishlistEntry<'a>> {
        self.entries.iter()
    }

    /// Number of saved products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capture the wishlist as plain data for persistence.
    pub fn snapshot(&self) -> WishlistSnapshot {
        WishlistSnapshot {
            entries: self
                .entries
                .iter()
                .map(|entry| WishlistSnapshotEntry {
                    product_id: entry.product.id.clone(),
                    added_at: entry.added_at,
                })
                .collect(),
        }
    }

    /// Rebuild a wishlist from a snapshot, keeping each original `added_at`.
    pub fn restore(snapshot: &WishlistSnapshot, catalog: &'a Catalog) -> Self {
        let mut wishlist = Self::new();

        for entry in &snapshot.entries {
            let Some(product) = catalog.product(&entry.product_id) else {
                warn!(product_id = %entry.product_id, "skipping unknown product in saved wishlist");
                continue;
            };

            wishlist.add_at(product, entry.added_at);
        }

        wishlist
    }
}

/// Persisted form of a [`Wishlist`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistSnapshot {
    /// Entries in the order they were saved
    pub entries: Vec<WishlistSnapshotEntry>,
}

/// Persisted form of a [`WishlistEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSnapshotEntry {
    /// Product id
    pub product_id: String,

    /// When it was saved
    pub added_at: Timestamp,
}
