//! YAML fixture catalog
//!
//! A catalog file holds `products`, `categories` and `brands` lists, with the
//! same field names as the remote JSON catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    catalog::{CatalogError, CatalogSource},
    products::{Brand, Category, ProductRecord},
};

/// Wrapper for a catalog in YAML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFixture {
    /// Product records
    pub products: Vec<ProductRecord>,

    /// Categories
    pub categories: Vec<Category>,

    /// Brands
    pub brands: Vec<Brand>,
}

/// Catalog source backed by a YAML file.
///
/// The file is read and parsed on the first fetch; later fetches reuse it.
#[derive(Debug, Clone)]
pub struct FixtureCatalog {
    path: PathBuf,
    fixture: OnceCell<CatalogFixture>,
}

impl FixtureCatalog {
    /// Use the catalog file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fixture: OnceCell::new(),
        }
    }

    /// Use the named catalog from a fixtures directory, i.e. `{base}/catalog/{name}.yml`.
    pub fn from_set(base_path: impl Into<PathBuf>, name: &str) -> Self {
        Self::new(base_path.into().join("catalog").join(format!("{name}.yml")))
    }

    /// Path of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn fixture(&self) -> Result<&CatalogFixture, CatalogError> {
        self.fixture
            .get_or_try_init(|| async {
                let contents = tokio::fs::read_to_string(&self.path).await?;
                let fixture: CatalogFixture = serde_norway::from_str(&contents)?;
                debug!(path = %self.path.display(), "parsed catalog fixture");

                Ok::<_, CatalogError>(fixture)
            })
            .await
    }
}

impl CatalogSource for FixtureCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        Ok(self.fixture().await?.products.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.fixture().await?.categories.clone())
    }

    async fn fetch_brands(&self) -> Result<Vec<Brand>, CatalogError> {
        Ok(self.fixture().await?.brands.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use super::*;
    use crate::catalog::Catalog;

    const CATALOG: &str = r#"
products:
  - id: "headphones"
    name: "سماعات لاسلكية"
    price: "59.99"
    discount: 20
    stock: 4
    category: "audio"
    newArrival: true
    rating: "4.5"
    colors: ["black", "white"]
categories:
  - id: "audio"
    name: "صوتيات"
brands:
  - id: "sony"
    name: "Sony"
"#;

    #[tokio::test]
    async fn loads_products_categories_and_brands() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CATALOG.as_bytes())?;

        let catalog = Catalog::load(&FixtureCatalog::new(file.path()), USD).await;

        let product = catalog.product("headphones");

        assert_eq!(product.map(|p| p.price), Some(Money::from_minor(59_99, USD)));
        assert_eq!(product.map(|p| p.flags.new_arrival), Some(true));
        assert_eq!(product.map(|p| p.colors.len()), Some(2));
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.brands().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn file_is_parsed_once() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CATALOG.as_bytes())?;
        let source = FixtureCatalog::new(file.path());

        assert_eq!(source.fetch_products().await?.len(), 1);

        std::fs::write(source.path(), "products: [")?;

        assert_eq!(source.fetch_products().await?.len(), 1);
        assert_eq!(source.fetch_brands().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn unparsable_file_is_an_error() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"products: [")?;
        let source = FixtureCatalog::new(file.path());

        assert!(matches!(
            source.fetch_products().await,
            Err(CatalogError::Yaml(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty() {
        let source = FixtureCatalog::from_set("./does-not-exist", "storefront");

        let catalog = Catalog::load(&source, USD).await;

        assert!(catalog.products().is_empty());
    }
}
