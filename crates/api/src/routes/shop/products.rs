//! Public product listing and detail.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{ProductId, ProductSort, parse_csv_filter};

use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::models::product::Product;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query string of the listing: comma-separated filters and a sort key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub sort_by: Option<String>,
}

impl From<ListQuery> for ProductFilter {
    fn from(query: ListQuery) -> Self {
        Self {
            categories: parse_csv_filter(query.category.as_deref()),
            brands: parse_csv_filter(query.brand.as_deref()),
            sort: ProductSort::parse_or_default(query.sort_by.as_deref()),
        }
    }
}

/// `GET /api/shop/products`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiResponse<Vec<Product>>> {
    let filter = ProductFilter::from(query);
    let products = ProductRepository::new(state.pool())
        .list_filtered(&filter)
        .await?;
    Ok(ApiResponse::ok(products))
}

/// `GET /api/shop/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found!".to_owned()))?;
    Ok(ApiResponse::ok(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_into_filter() {
        let filter = ProductFilter::from(ListQuery {
            category: Some(" men, ,women ".to_owned()),
            brand: None,
            sort_by: Some("title-ztoa".to_owned()),
        });
        assert_eq!(filter.categories, vec!["men", "women"]);
        assert!(filter.brands.is_empty());
        assert_eq!(filter.sort, ProductSort::TitleZToA);
    }

    #[test]
    fn test_empty_query_defaults_to_price_ascending() {
        let filter = ProductFilter::from(ListQuery::default());
        assert_eq!(filter.sort, ProductSort::PriceLowToHigh);
    }
}
