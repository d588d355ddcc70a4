//! Product catalog.
//!
//! Products are read once at start-up from a JSON array:
//!
//! ```json
//! [{ "handle": "classic-watch", "name": "ساعة يد كلاسيك", "price": "1500", "description": "..." }]
//! ```
//!
//! Without a file the storefront serves a small built-in catalog.

use std::path::{Path, PathBuf};

use matgar_core::{Price, Product};
use thiserror::Error;

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product handle: {0}")]
    DuplicateHandle(String),
    #[error("product handle cannot be empty")]
    EmptyHandle,
}

/// The products offered by the store, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or repeated handles.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if a handle is empty or used twice.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        for (i, product) in products.iter().enumerate() {
            if product.handle.trim().is_empty() {
                return Err(CatalogError::EmptyHandle);
            }
            if products
                .iter()
                .skip(i + 1)
                .any(|other| other.handle == product.handle)
            {
                return Err(CatalogError::DuplicateHandle(product.handle.clone()));
            }
        }
        Ok(Self { products })
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is invalid.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(raw)?)
    }

    /// The built-in catalog.
    #[must_use]
    pub fn seed() -> Self {
        let product = |handle: &str, name: &str, price: u32, description: &str| Product {
            handle: handle.to_string(),
            name: name.to_string(),
            price: Price::from_whole(price),
            description: description.to_string(),
        };

        Self {
            products: vec![
                product(
                    "classic-watch",
                    "ساعة يد كلاسيك",
                    1500,
                    "ساعة يد رجالي بسوار جلد طبيعي ومقاومة للماء.",
                ),
                product(
                    "bluetooth-headphones",
                    "سماعة بلوتوث لاسلكية",
                    750,
                    "سماعة رأس لاسلكية مع عزل للضوضاء وبطارية تدوم 30 ساعة.",
                ),
                product(
                    "travel-backpack",
                    "حقيبة ظهر للسفر",
                    450,
                    "حقيبة ظهر خفيفة بجيب مبطن للابتوب حتى 15 بوصة.",
                ),
            ],
        }
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by handle.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.handle == handle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_is_valid() {
        let seed = Catalog::seed();
        assert!(Catalog::new(seed.products().to_vec()).is_ok());
        assert!(seed.get("classic-watch").is_some());
        assert!(seed.get("missing").is_none());
    }

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(
            r#"[
                {"handle": "widget", "name": "Widget", "price": "50"},
                {"handle": "gadget", "name": "Gadget", "price": "75", "description": "Shiny"}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.products().len(), 2);
        let widget = catalog.get("widget").unwrap();
        assert_eq!(widget.price, Price::from_whole(50));
        assert!(widget.description.is_empty());
    }

    #[test]
    fn test_rejects_duplicates_and_bad_prices() {
        let dup = Catalog::from_json(
            r#"[{"handle": "a", "name": "A", "price": "1"}, {"handle": "a", "name": "B", "price": "2"}]"#,
        );
        assert!(matches!(dup, Err(CatalogError::DuplicateHandle(h)) if h == "a"));

        let negative = Catalog::from_json(r#"[{"handle": "a", "name": "A", "price": "-1"}]"#);
        assert!(matches!(negative, Err(CatalogError::Parse(_))));

        let empty = Catalog::from_json(r#"[{"handle": " ", "name": "A", "price": "1"}]"#);
        assert!(matches!(empty, Err(CatalogError::EmptyHandle)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
