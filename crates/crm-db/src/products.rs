//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use crm_core::{NewProduct, RestockPolicy};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::{contains_pattern, DbError};

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    /// `NUMERIC(10,2)`; always positive.
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Optional filters for [`list_products_filtered`]. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters<'a> {
    pub name_icontains: Option<&'a str>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
}

/// Returns every product, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    list_products_filtered(pool, ProductFilters::default()).await
}

/// Returns products matching every supplied filter, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_filtered(
    pool: &PgPool,
    filters: ProductFilters<'_>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, stock, created_at \
         FROM products \
         WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
           AND ($2::NUMERIC IS NULL OR price >= $2) \
           AND ($3::NUMERIC IS NULL OR price <= $3) \
           AND ($4::INTEGER IS NULL OR stock >= $4) \
           AND ($5::INTEGER IS NULL OR stock <= $5) \
         ORDER BY id",
    )
    .bind(contains_pattern(filters.name_icontains))
    .bind(filters.price_gte)
    .bind(filters.price_lte)
    .bind(filters.stock_gte)
    .bind(filters.stock_lte)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the products whose id is in `ids`, ordered by id.
///
/// Duplicate or unknown ids are ignored, so the result can be shorter than
/// `ids`. Rows are locked `FOR SHARE` so prices cannot change under an open
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<ProductRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, stock, created_at \
         FROM products \
         WHERE id = ANY($1) \
         ORDER BY id \
         FOR SHARE",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Creates one product after validating price and stock.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if a rule fails, or [`DbError::Sqlx`] if
/// the insert fails.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, DbError> {
    product.validate()?;

    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (name, price, stock) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, price, stock, created_at",
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Adds `policy.amount` units to every product below `policy.threshold`.
///
/// Runs as a single `UPDATE`, so concurrent restocks cannot double-count a
/// product. Returns the updated rows ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn restock_low_stock(
    pool: &PgPool,
    policy: RestockPolicy,
) -> Result<Vec<ProductRow>, DbError> {
    let mut rows = sqlx::query_as::<_, ProductRow>(
        "UPDATE products \
         SET stock = stock + $2 \
         WHERE stock < $1 \
         RETURNING id, name, price, stock, created_at",
    )
    .bind(policy.threshold)
    .bind(policy.amount)
    .fetch_all(pool)
    .await?;

    rows.sort_by_key(|r| r.id);
    Ok(rows)
}
