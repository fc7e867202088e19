//! Souq prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartEntry, CartEvent, CartSnapshot},
    catalog::{Catalog, CatalogError, CatalogSource, FixtureCatalog, HttpCatalog},
    config::{ConfigError, StoreConfig},
    discounts::DiscountError,
    display::{DisplayError, LocalCurrency},
    orders::{Order, OrderError, OrderHistory, OrderItem, OrderStatus, ShippingAddress},
    pricing::{OrderSummary, PricingError, PricingPolicy},
    products::{Brand, Category, Product, ProductError, ProductFlags, ProductRecord},
    receipt::{Receipt, ReceiptError},
    search::{Page, SearchError, SearchRequest, SortKey, paginate},
    storage::{LocalStorage, StorageError},
    wishlist::{Wishlist, WishlistEntry, WishlistEvent, WishlistSnapshot},
};
