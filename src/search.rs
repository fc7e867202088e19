//! Search
//!
//! Client-side filtering, sorting and pagination over an in-memory product
//! list. Everything here is a pure transformation; input order is preserved
//! unless a sort is requested, and all sorts are stable.

use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::Product;

/// Category key that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Number of products shown in the latest products section.
pub const LATEST_PRODUCTS: usize = 8;

/// Errors raised while parsing search parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Sort key not recognised.
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Sort order for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Keep the input order
    #[default]
    Relevance,

    /// Cheapest first
    PriceLow,

    /// Most expensive first
    PriceHigh,

    /// Best rated first
    Rating,

    /// New arrivals first
    Newest,
}

impl SortKey {
    /// The key as used in URLs and forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for SortKey {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "relevance" => Ok(Self::Relevance),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            "newest" => Ok(Self::Newest),
            other => Err(SearchError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Products whose name or category contains `query`, ignoring case.
///
/// A blank query matches every product.
pub fn search<'p, 'a: 'p>(
    query: &str,
    products: impl IntoIterator<Item = &'p Product<'a>>,
) -> Vec<&'p Product<'a>> {
    let needle = query.trim().to_lowercase();

    products
        .into_iter()
        .filter(|product| {
            needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Products in `category`; [`ALL_CATEGORIES`] keeps everything.
pub fn filter_by_category<'p, 'a: 'p>(
    products: impl IntoIterator<Item = &'p Product<'a>>,
    category: &str,
) -> Vec<&'p Product<'a>> {
    products
        .into_iter()
        .filter(|product| category == ALL_CATEGORIES || product.category == category)
        .collect()
}

/// Stable sort of `products` by `key`.
pub fn sort<'p, 'a: 'p>(mut products: Vec<&'p Product<'a>>, key: SortKey) -> Vec<&'p Product<'a>> {
    match key {
        SortKey::Relevance => {}
        SortKey::PriceLow => products.sort_by_key(|product| product.price.to_minor_units()),
        SortKey::PriceHigh => {
            products.sort_by_key(|product| Reverse(product.price.to_minor_units()));
        }
        SortKey::Rating => products.sort_by_key(|product| Reverse(product.rating)),
        SortKey::Newest => products.sort_by_key(|product| !product.flags.new_arrival),
    }

    products
}

/// A search as submitted from the search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,

    /// Category key, or [`ALL_CATEGORIES`]
    pub category: String,

    /// Requested order
    pub sort: SortKey,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
            sort: SortKey::Relevance,
        }
    }
}

impl SearchRequest {
    /// Search, then narrow to the category, then sort.
    pub fn run<'p, 'a: 'p>(
        &self,
        products: impl IntoIterator<Item = &'p Product<'a>>,
    ) -> Vec<&'p Product<'a>> {
        let matches = search(&self.query, products);
        let matches = filter_by_category(matches, &self.category);

        sort(matches, self.sort)
    }
}

/// The last `count` products, most recently added first.
pub fn latest<'p, 'a>(products: &'p [Product<'a>], count: usize) -> Vec<&'p Product<'a>> {
    products.iter().rev().take(count).collect()
}

/// Products flagged as featured.
pub fn featured<'p, 'a>(products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
    products.iter().filter(|p| p.flags.featured).collect()
}

/// Products flagged as best sellers.
pub fn best_sellers<'p, 'a>(products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
    products.iter().filter(|p| p.flags.best_seller).collect()
}

/// Products flagged as new arrivals.
pub fn new_arrivals<'p, 'a>(products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
    products.iter().filter(|p| p.flags.new_arrival).collect()
}

/// Products carrying a discount.
pub fn offers<'p, 'a>(products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
    products.iter().filter(|p| p.is_discounted()).collect()
}

/// One page of a longer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'s, T> {
    /// Items on this page
    pub items: &'s [T],

    /// 1-based page number
    pub page: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Total number of items across all pages
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice out 1-based `page` of `per_page` items. Pages out of range are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let total_pages = if per_page == 0 {
        0
    } else {
        items.len().div_ceil(per_page)
    };

    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());

    let slice: &[T] = if page == 0 {
        &[]
    } else {
        items.get(start..end).unwrap_or(&[])
    };

    Page {
        items: slice,
        page,
        total_pages,
        total_items: items.len(),
    }
}
