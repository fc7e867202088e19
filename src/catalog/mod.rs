//! Catalog
//!
//! Products, categories and brands come from a [`CatalogSource`]. Loading never
//! fails: a source that errors degrades to an empty list, and records that do
//! not validate are skipped.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, warn};

use crate::products::{Brand, Category, Product, ProductRecord};

pub mod fixture;
pub mod http;

pub use fixture::FixtureCatalog;
pub use http::HttpCatalog;

/// Errors raised by catalog sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP transport or decoding error.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status.
    #[error("catalog endpoint {url} answered {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// IO error reading a fixture file.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Somewhere products, categories and brands can be fetched from.
pub trait CatalogSource {
    /// Fetch every product record.
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError>;

    /// Fetch every category.
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Fetch every brand.
    async fn fetch_brands(&self) -> Result<Vec<Brand>, CatalogError>;
}

/// Products, categories and brands, with products indexed by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product<'static>>,
    product_index: FxHashMap<String, usize>,
    categories: Vec<Category>,
    brands: Vec<Brand>,
    currency: &'static Currency,
}

impl Catalog {
    /// Create an empty catalog priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: Vec::new(),
            product_index: FxHashMap::default(),
            categories: Vec::new(),
            brands: Vec::new(),
            currency,
        }
    }

    /// Load everything `source` offers.
    ///
    /// Any fetch that fails leaves its part of the catalog empty.
    pub async fn load(source: &impl CatalogSource, currency: &'static Currency) -> Self {
        let mut catalog = Self::new(currency);

        let records = source.fetch_products().await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch products; using an empty list");
            Vec::new()
        });

        catalog.extend_records(records);

        catalog.categories = source.fetch_categories().await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch categories; using an empty list");
            Vec::new()
        });

        catalog.brands = source.fetch_brands().await.unwrap_or_else(|error| {
            warn!(%error, "failed to fetch brands; using an empty list");
            Vec::new()
        });

        debug!(
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            brands = catalog.brands.len(),
            "loaded catalog"
        );

        catalog
    }

    /// Validate and add product records, skipping invalid ones and duplicate ids.
    pub fn extend_records(&mut self, records: impl IntoIterator<Item = ProductRecord>) {
        for record in records {
            match record.into_product(self.currency) {
                Ok(product) => self.insert(product),
                Err(error) => warn!(%error, "skipping invalid product record"),
            }
        }
    }

    /// Add a product. A product whose id is already present is ignored.
    pub fn insert(&mut self, product: Product<'static>) {
        if self.product_index.contains_key(&product.id) {
            warn!(product_id = %product.id, "skipping duplicate product id");
            return;
        }

        self.product_index
            .insert(product.id.clone(), self.products.len());
        self.products.push(product);
    }

    /// Look up a product by id.
    pub fn product(&self, id: &str) -> Option<&Product<'static>> {
        self.product_index
            .get(id)
            .and_then(|&index| self.products.get(index))
    }

    /// Every product, in catalog order.
    pub fn products(&self) -> &[Product<'static>] {
        &self.products
    }

    /// Every category.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every brand.
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Currency all products are priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Replace the categories.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    /// Replace the brands.
    pub fn set_brands(&mut self, brands: Vec<Brand>) {
        self.brands = brands;
    }
}
