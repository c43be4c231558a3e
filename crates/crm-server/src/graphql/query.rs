use async_graphql::connection::{query, Connection, Edge};
use async_graphql::{Context, Object, OutputType, Result};
use sqlx::PgPool;

use super::error::db_error;
use super::types::{Customer, CustomerFilter, Order, OrderFilter, Product, ProductFilter};

pub const GREETING: &str = "Hello, GraphQL!";

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Static greeting; the heartbeat job probes this field.
    async fn hello(&self) -> &'static str {
        GREETING
    }

    async fn customers(&self, ctx: &Context<'_>) -> Result<Vec<Customer>> {
        let pool = ctx.data::<PgPool>()?;
        let rows = crm_db::list_customers(pool).await.map_err(db_error)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let pool = ctx.data::<PgPool>()?;
        let rows = crm_db::list_products(pool).await.map_err(db_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let pool = ctx.data::<PgPool>()?;
        let rows = crm_db::list_orders(pool).await.map_err(db_error)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilter>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Customer>> {
        let pool = ctx.data::<PgPool>()?;
        let filter = filter.unwrap_or_default();
        let rows = crm_db::list_customers_filtered(pool, filter.as_db())
            .await
            .map_err(db_error)?;
        paginate(rows.into_iter().map(Customer::from).collect(), after, before, first, last).await
    }

    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilter>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Product>> {
        let pool = ctx.data::<PgPool>()?;
        let filter = filter.unwrap_or_default();
        let rows = crm_db::list_products_filtered(pool, filter.as_db())
            .await
            .map_err(db_error)?;
        paginate(rows.into_iter().map(Product::from).collect(), after, before, first, last).await
    }

    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilter>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Order>> {
        let pool = ctx.data::<PgPool>()?;
        let filter = filter.unwrap_or_default();
        let rows = match filter.as_db() {
            Some(filters) => crm_db::list_orders_filtered(pool, filters)
                .await
                .map_err(db_error)?,
            None => Vec::new(),
        };
        paginate(rows.into_iter().map(Order::from).collect(), after, before, first, last).await
    }
}

/// Slices an already-filtered list into a Relay connection.
///
/// Cursors are offsets into `items`, so they are only stable while the
/// underlying rows do not change.
async fn paginate<T: OutputType>(
    items: Vec<T>,
    after: Option<String>,
    before: Option<String>,
    first: Option<i32>,
    last: Option<i32>,
) -> Result<Connection<usize, T>> {
    query(
        after,
        before,
        first,
        last,
        |after: Option<usize>, before: Option<usize>, first: Option<usize>, last: Option<usize>| async move {
            let (start, end) = window(items.len(), after, before, first, last);
            let mut connection = Connection::new(start > 0, end < items.len());
            connection.edges.extend(
                items
                    .into_iter()
                    .enumerate()
                    .skip(start)
                    .take(end - start)
                    .map(|(offset, node)| Edge::new(offset, node)),
            );
            Ok::<_, async_graphql::Error>(connection)
        },
    )
    .await
}

/// Resolves Relay arguments to a half-open `[start, end)` range over `total` items.
fn window(
    total: usize,
    after: Option<usize>,
    before: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
) -> (usize, usize) {
    let mut start = after.map_or(0, |a| a.saturating_add(1)).min(total);
    let mut end = before.map_or(total, |b| b.min(total)).max(start);

    if let Some(first) = first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = last {
        start = start.max(end.saturating_sub(last));
    }
    (start, end)
}
