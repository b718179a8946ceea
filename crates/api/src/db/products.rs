//! Product catalogue repository.
//!
//! Listing and admin CRUD go through [`ProductRepository`]. Stock and rating
//! updates that must share a transaction with other writes are free
//! functions taking a `PgConnection`.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use bazaar_core::{Page, ProductId, ProductSort, SearchSort, escape_like};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, title, description, category, brand, image, price, sale_price, \
     total_stock, average_review, created_at, updated_at";

/// Maximum number of title suggestions returned.
pub const SUGGESTION_LIMIT: i64 = 5;

/// Filters for the shop listing. Empty vectors mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub sort: ProductSort,
}

/// Filters for keyword search.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub keyword: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SearchSort,
    pub page: Page,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    Applied,
    Insufficient,
    Missing,
}

const fn listing_order(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::PriceLowToHigh => "price ASC, id ASC",
        ProductSort::PriceHighToLow => "price DESC, id ASC",
        ProductSort::TitleAToZ => "title ASC, id ASC",
        ProductSort::TitleZToA => "title DESC, id ASC",
    }
}

const fn search_order(sort: SearchSort) -> &'static str {
    match sort {
        SearchSort::Relevance | SearchSort::Newest => "id DESC",
        SearchSort::PriceAsc => "price ASC, id ASC",
        SearchSort::PriceDesc => "price DESC, id ASC",
    }
}

/// Append the search `WHERE` clause to a query builder.
fn push_search_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &SearchQuery) {
    let pattern = format!("%{}%", escape_like(query.keyword.trim()));

    qb.push(" WHERE (title ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR description ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR category ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR brand ILIKE ")
        .push_bind(pattern)
        .push(")");

    if let Some(category) = &query.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(brand) = &query.brand {
        qb.push(" AND brand = ").push_bind(brand.clone());
    }
    if let Some(min) = query.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the shop filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_filtered(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE (cardinality($1::text[]) = 0 OR category = ANY($1))
              AND (cardinality($2::text[]) = 0 OR brand = ANY($2))
            ORDER BY {}
            ",
            listing_order(filter.sort)
        );

        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(&filter.categories)
            .bind(&filter.brands)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get every product whose ID is in `ids`. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Find a product by exact title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_with_title(&self, title: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shop.product WHERE title = $1)",
        )
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO shop.product
                (image, title, description, category, brand, price, sale_price,
                 total_stock, average_review)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.image)
        .bind(product.title.trim())
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(product.sale_price)
        .bind(product.total_stock)
        .bind(product.average_review)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Apply a partial update. Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE shop.product SET
                image = COALESCE($2, image),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                brand = COALESCE($6, brand),
                price = COALESCE($7, price),
                sale_price = COALESCE($8, sale_price),
                total_stock = COALESCE($9, total_stock),
                average_review = COALESCE($10, average_review)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.image)
        .bind(update.title.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(&update.category)
        .bind(&update.brand)
        .bind(update.price)
        .bind(update.sale_price)
        .bind(update.total_stock)
        .bind(update.average_review)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Keyword search with filters, sorting and paging.
    ///
    /// Returns the requested page and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM shop.product");
        push_search_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM shop.product"));
        push_search_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(search_order(query.sort))
            .push(" LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows = qb.build_query_as::<Product>().fetch_all(self.pool).await?;

        Ok((rows, total))
    }

    /// Distinct product titles containing `keyword`, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn suggestions(&self, keyword: &str) -> Result<Vec<String>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        let titles = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT title
            FROM shop.product
            WHERE title ILIKE $1
            ORDER BY title
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(SUGGESTION_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(titles)
    }
}

/// Decrement stock only if enough is available.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<StockDecrement, RepositoryError> {
    let updated = sqlx::query_scalar::<_, ProductId>(
        r"
        UPDATE shop.product
        SET total_stock = total_stock - $2
        WHERE id = $1 AND total_stock >= $2
        RETURNING id
        ",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    if updated.is_some() {
        return Ok(StockDecrement::Applied);
    }

    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shop.product WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(if exists {
        StockDecrement::Insufficient
    } else {
        StockDecrement::Missing
    })
}

/// Lock a product row until the transaction ends.
///
/// Returns `false` if the product does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(conn: &mut PgConnection, id: ProductId) -> Result<bool, RepositoryError> {
    let row = sqlx::query_scalar::<_, ProductId>(
        "SELECT id FROM shop.product WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row.is_some())
}

/// Store a recomputed review average.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_average_review(
    conn: &mut PgConnection,
    id: ProductId,
    average: f64,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE shop.product SET average_review = $2 WHERE id = $1")
        .bind(id)
        .bind(average)
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_order_breaks_ties_by_id() {
        for sort in [
            ProductSort::PriceLowToHigh,
            ProductSort::PriceHighToLow,
            ProductSort::TitleAToZ,
            ProductSort::TitleZToA,
        ] {
            assert!(listing_order(sort).ends_with("id ASC"));
        }
    }

    #[test]
    fn test_search_filters_escape_keyword() {
        let query = SearchQuery {
            keyword: "50%_off".to_owned(),
            category: Some("men".to_owned()),
            min_price: Some(Decimal::new(10, 0)),
            ..SearchQuery::default()
        };
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 FROM shop.product");
        push_search_filters(&mut qb, &query);
        let sql = qb.sql();
        assert!(sql.contains("title ILIKE $1"));
        assert!(sql.contains("brand ILIKE $4"));
        assert!(sql.contains("AND category = $5"));
        assert!(sql.contains("AND price >= $6"));
        assert!(!sql.contains("brand = $"));
    }
}
