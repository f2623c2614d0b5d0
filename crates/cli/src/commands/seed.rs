//! Seed the catalog with products from a YAML file.
//!
//! # File Format
//!
//! ```yaml
//! products:
//!   - name: Fountain pen
//!     price: "10.00"
//!     rating: 4
//!     image: https://cdn.example.com/pen.jpg
//!   - id: 5f0c8e1e-3b0a-4f55-9d3c-4a7b2a4f0e21   # optional, generated if absent
//!     name: Notebook
//!     price: "25.00"
//!     rating: 5
//!     image: https://cdn.example.com/notebook.jpg
//! ```
//!
//! The whole file is validated before connecting to the database. Products
//! whose ID already exists are skipped, so re-running a file with fixed IDs
//! is harmless.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use cartline_core::{Price, ProductId};
use cartline_storefront::db::{DocumentStore, PgDocumentStore, RepositoryError};
use cartline_storefront::models::Product;

use super::{CliError, connect};

/// Top-level shape of a product seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeedFile {
    pub products: Vec<ProductSeed>,
}

/// One product entry in a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub image: String,
}

impl ProductSeed {
    fn into_product(self) -> Product {
        Product {
            id: self.id.unwrap_or_else(ProductId::generate),
            name: self.name,
            price: self.price,
            rating: self.rating,
            image: self.image,
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Check every entry, returning one message per problem found.
#[must_use]
pub fn validate(file: &ProductSeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    if file.products.is_empty() {
        errors.push("file contains no products".to_string());
    }

    for (index, seed) in file.products.iter().enumerate() {
        if seed.name.trim().is_empty() {
            errors.push(format!("products[{index}]: name must not be empty"));
        }
        if seed.price.is_negative() {
            errors.push(format!(
                "products[{index}] ({}): price must not be negative",
                seed.name
            ));
        }
    }

    let mut ids: Vec<ProductId> = file.products.iter().filter_map(|s| s.id).collect();
    ids.sort_unstable();
    for pair in ids.windows(2) {
        if let [a, b] = pair
            && a == b
        {
            errors.push(format!("duplicate product id {a}"));
        }
    }

    errors
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any entry is invalid.
pub fn parse(content: &str) -> Result<ProductSeedFile, CliError> {
    let file: ProductSeedFile = serde_yaml::from_str(content)?;

    let errors = validate(&file);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CliError::Validation(errors.len()));
    }

    Ok(file)
}

/// Insert each product, skipping IDs that already exist.
///
/// # Errors
///
/// Returns the first store error other than an existing ID.
pub async fn insert_all(
    store: &dyn DocumentStore,
    file: ProductSeedFile,
) -> Result<SeedSummary, CliError> {
    let mut summary = SeedSummary::default();

    for seed in file.products {
        let product = seed.into_product();
        match store.insert_product(&product).await {
            Ok(()) => {
                info!(product_id = %product.id, name = %product.name, "Inserted product");
                summary.inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(product_id = %product.id, "Product exists, skipping");
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(summary)
}

/// Seed catalog products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, the database
/// URL is missing, or an insert fails.
pub async fn products(path: &Path) -> Result<(), CliError> {
    info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let file = parse(&content)?;
    info!(products = file.products.len(), "Seed file validated");

    let store = PgDocumentStore::new(connect().await?);
    let summary = insert_all(&store, file).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cartline_storefront::db::MemoryDocumentStore;

    const CATALOG: &str = r#"
products:
  - name: Fountain pen
    price: "10.00"
    rating: 4
    image: https://cdn.example.com/pen.jpg
  - id: 5f0c8e1e-3b0a-4f55-9d3c-4a7b2a4f0e21
    name: Notebook
    price: "25.00"
    rating: 5
"#;

    #[test]
    fn test_parse_catalog() {
        let file = parse(CATALOG).unwrap();

        assert_eq!(file.products.len(), 2);
        assert_eq!(file.products[0].price, Price::from_units(10));
        assert!(file.products[0].id.is_none());
        assert!(file.products[1].id.is_some());
        assert_eq!(file.products[1].image, "");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse("products:\n  - name: pen\n    price: \"1\"\n    colour: red\n").unwrap_err();
        assert!(matches!(err, CliError::Yaml(_)));
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let file: ProductSeedFile = serde_yaml::from_str(
            r#"
products:
  - name: " "
    price: "-1"
  - id: 5f0c8e1e-3b0a-4f55-9d3c-4a7b2a4f0e21
    name: a
    price: "1"
  - id: 5f0c8e1e-3b0a-4f55-9d3c-4a7b2a4f0e21
    name: b
    price: "1"
"#,
        )
        .unwrap();

        let errors = validate(&file);

        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(matches!(
            parse("products: []\n").unwrap_err(),
            CliError::Validation(1)
        ));
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_ids() {
        let store = MemoryDocumentStore::new();

        let first = insert_all(&store, parse(CATALOG).unwrap()).await.unwrap();
        let second = insert_all(&store, parse(CATALOG).unwrap()).await.unwrap();

        assert_eq!(first, SeedSummary { inserted: 2, skipped: 0 });
        assert_eq!(second, SeedSummary { inserted: 1, skipped: 1 });
    }
}
