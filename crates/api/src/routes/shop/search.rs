//! Keyword search and title suggestions.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{Page, SearchSort};

use crate::db::products::{ProductRepository, SearchQuery};
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::models::product::Product;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Keywords shorter than this get no suggestions.
const MIN_SUGGESTION_CHARS: usize = 2;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

impl SearchParams {
    fn into_query(self, keyword: String) -> SearchQuery {
        let non_blank = |v: Option<String>| {
            v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
        };
        SearchQuery {
            keyword,
            category: non_blank(self.category),
            brand: non_blank(self.brand),
            min_price: self.min_price,
            max_price: self.max_price,
            sort: SearchSort::parse_or_default(self.sort.as_deref()),
            page: Page::new(self.page, self.limit),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<Product>,
    pub total: i64,
}

/// `GET /api/shop/search/{keyword}`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiPath(keyword): ApiPath<String>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::BadRequest("Keyword is required".to_owned()));
    }

    let query = params.into_query(keyword.to_owned());
    let (data, total) = ProductRepository::new(state.pool()).search(&query).await?;

    Ok(Json(SearchResponse {
        success: true,
        data,
        total,
    }))
}

/// `GET /api/shop/search/suggestions/{keyword}`
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    ApiPath(keyword): ApiPath<String>,
) -> Result<ApiResponse<Vec<String>>> {
    let keyword = keyword.trim();
    if keyword.chars().count() < MIN_SUGGESTION_CHARS {
        return Ok(ApiResponse::ok(Vec::new()));
    }

    let titles = ProductRepository::new(state.pool())
        .suggestions(keyword)
        .await?;
    Ok(ApiResponse::ok(titles))
}
