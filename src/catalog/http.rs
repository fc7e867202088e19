//! Remote JSON catalog.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    catalog::{CatalogError, CatalogSource},
    products::{Brand, Category, ProductRecord},
};

/// HTTP client for a catalog exposing `/products`, `/categories` and `/brands`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    http: Client,
}

impl HttpCatalog {
    /// Create a new client for the catalog at `base_url`, e.g. `"https://shop.example/api"`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// URL for a catalog resource.
    pub fn url(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str) -> Result<T, CatalogError> {
        let url = self.url(resource);

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        self.get_json("products").await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.get_json("categories").await
    }

    async fn fetch_brands(&self) -> Result<Vec<Brand>, CatalogError> {
        self.get_json("brands").await
    }
}
