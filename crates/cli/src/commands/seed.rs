//! Seed the product catalogue from a YAML file.
//!
//! ```yaml
//! products:
//!   - title: Canvas Sneaker
//!     description: Low-top everyday sneaker
//!     category: footwear
//!     brand: nike
//!     price: "59.99"
//!     salePrice: "49.99"
//!     totalStock: 40
//!     image: https://res.cloudinary.com/demo/image/upload/sneaker.jpg
//! ```
//!
//! Products whose title already exists are skipped, so the file can be
//! applied repeatedly.

use std::path::Path;

use serde::Deserialize;

use bazaar_api::db::products::ProductRepository;
use bazaar_api::models::product::NewProduct;

use super::{CliError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<NewProduct>,
}

/// Counts reported after seeding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Parse and validate a seed file.
fn parse(content: &str) -> Result<Vec<NewProduct>, CliError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    for (index, product) in file.products.iter().enumerate() {
        product
            .validate()
            .map_err(|e| {
                CliError::Invalid(format!("product #{}: {}", index + 1, e.client_message()))
            })?;
    }
    Ok(file.products)
}

/// Insert every product from `file_path` that is not already present.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product is
/// invalid, or a database operation fails.
pub async fn products(file_path: &str) -> Result<SeedSummary, CliError> {
    let path = Path::new(file_path);
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;

    // Validate the whole file before touching the database
    let products = parse(&content)?;
    tracing::info!(count = products.len(), path = %file_path, "Parsed seed file");

    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    let mut summary = SeedSummary::default();
    for product in &products {
        if repo.exists_with_title(product.title.trim()).await? {
            tracing::debug!(title = %product.title, "Skipping existing product");
            summary.skipped += 1;
            continue;
        }
        let created = repo.create(product).await?;
        tracing::info!(product_id = %created.id, title = %created.title, "Product inserted");
        summary.inserted += 1;
    }

    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Seeding complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let yaml = r#"
products:
  - title: Canvas Sneaker
    category: footwear
    brand: nike
    price: "59.99"
    salePrice: "49.99"
    totalStock: 40
  - title: Wool Beanie
    price: "12.00"
"#;
        let products = parse(yaml).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products.first().unwrap().total_stock, 40);
        assert_eq!(products.last().unwrap().brand, "");
    }

    #[test]
    fn test_parse_rejects_invalid_product() {
        let yaml = r#"
products:
  - title: "  "
    price: "10.00"
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().starts_with("product #1"));
    }
}
