//! Database operations for `orders` and `order_products`.

use chrono::{DateTime, Utc};
use crm_core::{check_resolved_products, order_total, NewOrder, ValidationError};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{contains_pattern, products::list_products_by_ids, DbError, ProductRow};

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    /// Sum of the linked products' prices when the order was placed.
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

/// Optional filters for [`list_orders_filtered`]. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters<'a> {
    /// Case-insensitive substring of the customer's name.
    pub customer_name: Option<&'a str>,
    /// Matches orders containing at least one product whose name contains this.
    pub product_name: Option<&'a str>,
    /// Matches orders containing this product.
    pub product_id: Option<i64>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
}

/// Returns every order, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderRow>, DbError> {
    list_orders_filtered(pool, OrderFilters::default()).await
}

/// Returns orders matching every supplied filter, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_filtered(
    pool: &PgPool,
    filters: OrderFilters<'_>,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT o.id, o.customer_id, o.total_amount, o.order_date \
         FROM orders o \
         JOIN customers c ON c.id = o.customer_id \
         WHERE ($1::TEXT IS NULL OR c.name ILIKE $1) \
           AND ($2::TEXT IS NULL OR EXISTS ( \
                 SELECT 1 FROM order_products op \
                 JOIN products p ON p.id = op.product_id \
                 WHERE op.order_id = o.id AND p.name ILIKE $2)) \
           AND ($3::BIGINT IS NULL OR EXISTS ( \
                 SELECT 1 FROM order_products op \
                 WHERE op.order_id = o.id AND op.product_id = $3)) \
           AND ($4::NUMERIC IS NULL OR o.total_amount >= $4) \
           AND ($5::NUMERIC IS NULL OR o.total_amount <= $5) \
           AND ($6::timestamptz IS NULL OR o.order_date >= $6) \
           AND ($7::timestamptz IS NULL OR o.order_date <= $7) \
         ORDER BY o.id",
    )
    .bind(contains_pattern(filters.customer_name))
    .bind(contains_pattern(filters.product_name))
    .bind(filters.product_id)
    .bind(filters.total_amount_gte)
    .bind(filters.total_amount_lte)
    .bind(filters.order_date_gte)
    .bind(filters.order_date_lte)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the products linked to an order, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_order_products(pool: &PgPool, order_id: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.name, p.price, p.stock, p.created_at \
         FROM order_products op \
         JOIN products p ON p.id = op.product_id \
         WHERE op.order_id = $1 \
         ORDER BY p.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates an order for an existing customer and links its products.
///
/// The customer lookup, product resolution, order insert, and link inserts
/// share one transaction; any failure leaves no order behind. The total is
/// the exact sum of the resolved products' current prices. `order_date`
/// defaults to now.
///
/// # Errors
///
/// Returns [`DbError::Validation`] with
/// [`ValidationError::InvalidCustomerId`], [`ValidationError::NoValidProducts`],
/// or [`ValidationError::InvalidProductIds`]; [`DbError::Sqlx`] on database
/// failure.
pub async fn create_order(pool: &PgPool, order: &NewOrder) -> Result<OrderRow, DbError> {
    let mut tx = pool.begin().await?;

    let customer: Option<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM customers WHERE id = $1")
        .bind(order.customer_id)
        .fetch_optional(&mut *tx)
        .await?;
    if customer.is_none() {
        return Err(ValidationError::InvalidCustomerId.into());
    }

    let products = list_products_by_ids(&mut *tx, &order.product_ids).await?;
    check_resolved_products(order.requested_products, products.len())?;

    let total_amount = order_total(products.iter().map(|p| p.price));
    let order_date = order.order_date.unwrap_or_else(Utc::now);

    let row = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (customer_id, total_amount, order_date) \
         VALUES ($1, $2, $3) \
         RETURNING id, customer_id, total_amount, order_date",
    )
    .bind(order.customer_id)
    .bind(total_amount)
    .bind(order_date)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    sqlx::query(
        "INSERT INTO order_products (order_id, product_id) \
         SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(row.id)
    .bind(&product_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}
