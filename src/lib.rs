//! Souq
//!
//! Souq is the storefront core of an Arabic-language online shop: product catalog,
//! cart and wishlist stores, order totals, client-side search and order history.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod discounts;
pub mod display;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod search;
pub mod storage;
pub mod wishlist;
