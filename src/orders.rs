//! Orders
//!
//! Orders are snapshots taken at checkout. The history is kept in local
//! storage and is never consulted by the cart.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    cart::Cart,
    pricing::{PricingError, PricingPolicy},
    products::minor_to_major,
    storage::{LocalStorage, ORDERS_KEY, StorageError},
};

/// Errors raised while placing an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet delivered
    #[default]
    Pending,

    /// Delivered to the customer
    Delivered,

    /// Cancelled before delivery
    Cancelled,
}

impl OrderStatus {
    /// Delivery note shown to the customer.
    pub fn delivery_note(self) -> &'static str {
        match self {
            Self::Delivered => "تم التوصيل",
            Self::Cancelled => "ملغى",
            Self::Pending => "يتم التوصيل بمدة لاتزيد عن 5 ايام",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "Pending",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        })
    }
}

/// Where an order is shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name
    pub name: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Contact phone number
    pub phone: String,
}

/// A cart line frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id
    pub product_id: String,

    /// Product name at checkout
    pub name: String,

    /// Effective unit price at checkout, in major units
    pub unit_price: Decimal,

    /// Units ordered
    pub quantity: u32,

    /// Variant tag
    #[serde(default)]
    pub variant: Option<String>,
}

impl OrderItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: String,

    /// Items as they were at checkout
    pub items: Vec<OrderItem>,

    /// Grand total including shipping and tax, in major units
    pub total: Decimal,

    /// ISO currency code of every amount in the order
    pub currency: String,

    /// Fulfilment state
    #[serde(default)]
    pub status: OrderStatus,

    /// Delivery address
    pub shipping_address: ShippingAddress,

    /// When the order was placed
    pub created_at: Timestamp,
}

impl Order {
    /// Snapshot `cart` into a pending order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] for an empty cart, or a pricing error if the
    /// totals cannot be calculated.
    pub fn place(
        cart: &Cart<'_>,
        shipping_address: ShippingAddress,
        policy: &PricingPolicy,
        created_at: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let items = cart
            .iter()
            .map(|entry| {
                let unit_price = entry
                    .product()
                    .effective_price()
                    .map_err(PricingError::from)?;

                Ok(OrderItem {
                    product_id: entry.product().id.clone(),
                    name: entry.product().name.clone(),
                    unit_price: minor_to_major(&unit_price),
                    quantity: entry.quantity(),
                    variant: entry.variant().map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        let total = policy.grand_total(&cart.subtotal()?)?;

        Ok(Self {
            id: Uuid::now_v7().to_string(),
            items,
            total: minor_to_major(&total),
            currency: cart.currency().iso_alpha_code.to_string(),
            status: OrderStatus::Pending,
            shipping_address,
            created_at,
        })
    }

    /// Total units across all items.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }
}

/// Orders placed on this device, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    /// Read the saved history for display. A missing or unreadable history is
    /// empty; never save a history obtained this way, use [`Self::append`].
    pub fn load(storage: &LocalStorage) -> Self {
        Self::try_load(storage).unwrap_or_else(|error| {
            warn!(%error, "failed to read order history; showing it empty");
            Self::default()
        })
    }

    /// Read the saved history. A missing history is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if a saved history exists but cannot be read.
    pub fn try_load(storage: &LocalStorage) -> Result<Self, StorageError> {
        let history = storage.load::<Self>(ORDERS_KEY)?.unwrap_or_default();
        debug!(orders = history.len(), "loaded order history");

        Ok(history)
    }

    /// Add `order` to the stored history and write it back.
    ///
    /// A saved history that cannot be read is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the history cannot be read or written.
    pub fn append(storage: &LocalStorage, order: Order) -> Result<Self, StorageError> {
        let mut history = Self::try_load(storage)?;
        history.record(order);
        history.save(storage)?;

        Ok(history)
    }

    /// Write the history back to storage.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the history cannot be written.
    pub fn save(&self, storage: &LocalStorage) -> Result<(), StorageError> {
        storage.save(ORDERS_KEY, self)
    }

    /// Append a placed order.
    pub fn record(&mut self, order: Order) {
        debug!(order_id = %order.id, "recorded order");
        self.orders.push(order);
    }

    /// Every order, oldest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Look up an order by id.
    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no orders have been placed.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
