//! Seed the catalog from a YAML file.
//!
//! # File Format
//!
//! ```yaml
//! categories:
//!   - name: Kitchen
//!     products:
//!       - name: Teapot
//!         description: Cast iron, 1.2 litres.
//!         price: "24.50"
//!         image_url: https://images.example.com/teapot.jpg
//! ```
//!
//! Categories and products are upserted by name, so running the command
//! twice leaves the catalog unchanged.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use shopfront_core::Price;
use shopfront_storefront::db::{self, CatalogRepository};

use super::database_url;

/// Decimal places the `price` column keeps.
const PRICE_SCALE: u32 = 2;

/// Largest amount `NUMERIC(10, 2)` holds.
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, PRICE_SCALE);

/// A catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

/// One category and its products.
#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One product.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub image_url: Option<String>,
}

/// Totals reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

/// Check a catalog file for problems the database would reject or that
/// would silently merge rows.
#[must_use]
pub fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut product_names = std::collections::HashSet::new();

    for category in &catalog.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_string());
        }

        for product in &category.products {
            if product.name.trim().is_empty() {
                errors.push(format!("product with an empty name in '{}'", category.name));
            }
            let amount = product.price.amount();
            if product.price < Price::ZERO {
                errors.push(format!("'{}' has a negative price", product.name));
            }
            if amount.normalize().scale() > PRICE_SCALE {
                errors.push(format!(
                    "'{}' has more than {PRICE_SCALE} decimal places",
                    product.name
                ));
            }
            if amount > MAX_PRICE {
                errors.push(format!("'{}' costs more than {MAX_PRICE}", product.name));
            }
            if !product_names.insert(product.name.as_str()) {
                errors.push(format!("'{}' is listed more than once", product.name));
            }
        }
    }

    errors
}

/// Upsert every category and product in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, validation fails,
/// or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = CatalogRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for category in &catalog.categories {
        let category_id = repo.upsert_category(category.name.trim()).await?;
        summary.categories += 1;

        for product in &category.products {
            repo.upsert_product(
                category_id,
                product.name.trim(),
                &product.description,
                product.price,
                product.image_url.as_deref(),
            )
            .await?;
            summary.products += 1;
        }
    }

    info!(
        categories = summary.categories,
        products = summary.products,
        "Seeding complete!"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
categories:
  - name: Kitchen
    products:
      - name: Teapot
        description: Cast iron.
        price: "24.50"
        image_url: https://images.example.com/teapot.jpg
      - name: Mug
        price: "4.50"
  - name: Garden
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog: CatalogFile = serde_yaml::from_str(CATALOG).unwrap();

        assert_eq!(catalog.categories.len(), 2);
        let kitchen = &catalog.categories[0];
        assert_eq!(kitchen.products.len(), 2);
        assert_eq!(kitchen.products[0].price, Price::new(Decimal::new(2450, 2)));
        assert_eq!(kitchen.products[1].description, "");
        assert!(kitchen.products[1].image_url.is_none());
        assert!(catalog.categories[1].products.is_empty());
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_rows() {
        let catalog = CatalogFile {
            categories: vec![CategorySeed {
                name: " ".to_string(),
                products: vec![
                    ProductSeed {
                        name: "Teapot".to_string(),
                        description: String::new(),
                        price: Price::from_cents(-1),
                        image_url: None,
                    },
                    ProductSeed {
                        name: "Teapot".to_string(),
                        description: String::new(),
                        price: Price::from_cents(100),
                        image_url: None,
                    },
                ],
            }],
        };

        let errors = validate(&catalog);
        assert_eq!(errors.len(), 3);
    }

    fn priced(price: &str) -> CatalogFile {
        CatalogFile {
            categories: vec![CategorySeed {
                name: "Kitchen".to_string(),
                products: vec![ProductSeed {
                    name: "Teapot".to_string(),
                    description: String::new(),
                    price: Price::new(price.parse().unwrap()),
                    image_url: None,
                }],
            }],
        }
    }

    #[test]
    fn test_validate_price_fits_column() {
        assert_eq!(MAX_PRICE, "99999999.99".parse::<Decimal>().unwrap());

        assert!(validate(&priced("24.50")).is_empty());
        assert!(validate(&priced("24.500")).is_empty());
        assert!(validate(&priced("99999999.99")).is_empty());

        let errors = validate(&priced("24.505"));
        assert_eq!(errors, ["'Teapot' has more than 2 decimal places"]);

        let errors = validate(&priced("100000000.00"));
        assert_eq!(errors, ["'Teapot' costs more than 99999999.99"]);
    }
}
