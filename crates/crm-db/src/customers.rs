//! Database operations for the `customers` table.

use chrono::{DateTime, Utc};
use crm_core::{BulkRejection, NewCustomer, ValidationError};
use sqlx::{Connection, PgConnection, PgExecutor, PgPool};

use crate::{contains_pattern, is_unique_violation, prefix_pattern, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Optional filters for [`list_customers_filtered`]. `None` fields match all rows.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilters<'a> {
    /// Case-insensitive substring of `name`.
    pub name_icontains: Option<&'a str>,
    /// Case-insensitive substring of `email`.
    pub email_icontains: Option<&'a str>,
    /// Prefix of `phone`, e.g. `"+1"`.
    pub phone_prefix: Option<&'a str>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
}

/// Result of [`bulk_create_customers`]: inserted rows and skipped items, each
/// in input order.
#[derive(Debug, Clone, Default)]
pub struct BulkCreateOutcome {
    pub created: Vec<CustomerRow>,
    pub errors: Vec<BulkRejection>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns `true` if a customer already uses `email` (exact match).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, DbError>
where
    E: PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM customers WHERE email = $1)")
            .bind(email)
            .fetch_one(executor)
            .await?;

    Ok(exists)
}

/// Returns every customer, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_customers(pool: &PgPool) -> Result<Vec<CustomerRow>, DbError> {
    list_customers_filtered(pool, CustomerFilters::default()).await
}

/// Returns customers matching every supplied filter, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_customers_filtered(
    pool: &PgPool,
    filters: CustomerFilters<'_>,
) -> Result<Vec<CustomerRow>, DbError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, email, phone, created_at \
         FROM customers \
         WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
           AND ($2::TEXT IS NULL OR email ILIKE $2) \
           AND ($3::TEXT IS NULL OR phone LIKE $3) \
           AND ($4::timestamptz IS NULL OR created_at >= $4) \
           AND ($5::timestamptz IS NULL OR created_at <= $5) \
         ORDER BY id",
    )
    .bind(contains_pattern(filters.name_icontains))
    .bind(contains_pattern(filters.email_icontains))
    .bind(prefix_pattern(filters.phone_prefix))
    .bind(filters.created_at_gte)
    .bind(filters.created_at_lte)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single customer by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_customer(pool: &PgPool, id: i64) -> Result<Option<CustomerRow>, DbError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, email, phone, created_at FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

async fn insert_customer<'e, E>(executor: E, customer: &NewCustomer) -> Result<CustomerRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CustomerRow>(
        "INSERT INTO customers (name, email, phone) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, email, phone, created_at",
    )
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(customer.phone())
    .fetch_one(executor)
    .await
}

/// Creates one customer.
///
/// Checks email uniqueness first, then phone format. A unique-constraint
/// violation from a concurrent insert is reported the same way as the
/// up-front duplicate check.
///
/// # Errors
///
/// Returns [`DbError::Validation`] with [`ValidationError::DuplicateEmail`] or
/// [`ValidationError::InvalidPhone`], or [`DbError::Sqlx`] if the insert fails.
pub async fn create_customer(pool: &PgPool, customer: &NewCustomer) -> Result<CustomerRow, DbError> {
    if email_exists(pool, &customer.email).await? {
        return Err(ValidationError::DuplicateEmail.into());
    }
    customer.validate_format()?;

    match insert_customer(pool, customer).await {
        Ok(row) => Ok(row),
        Err(e) if is_unique_violation(&e) => Err(ValidationError::DuplicateEmail.into()),
        Err(e) => Err(e.into()),
    }
}

/// Inserts each customer independently inside one transaction.
///
/// Every item runs in its own savepoint. A rule violation or a failed insert
/// rolls back only that item's savepoint and is recorded in
/// [`BulkCreateOutcome::errors`]; the rest of the batch continues. Emails
/// inserted earlier in the batch count as taken for later items.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] only when the transaction itself cannot proceed
/// (begin, savepoint rollback, or commit fails). The whole batch is rolled
/// back in that case.
pub async fn bulk_create_customers(
    pool: &PgPool,
    customers: &[NewCustomer],
) -> Result<BulkCreateOutcome, DbError> {
    let mut tx = pool.begin().await?;
    let mut outcome = BulkCreateOutcome::default();

    for customer in customers {
        let mut savepoint = tx.begin().await?;

        match insert_bulk_item(&mut savepoint, customer).await {
            Ok(Ok(row)) => {
                savepoint.commit().await?;
                outcome.created.push(row);
            }
            Ok(Err(rejection)) => {
                savepoint.rollback().await?;
                tracing::debug!(email = %customer.email, %rejection, "bulk customer skipped");
                outcome.errors.push(rejection);
            }
            Err(e) => {
                savepoint.rollback().await?;
                tracing::warn!(email = %customer.email, error = %e, "bulk customer insert failed");
                outcome.errors.push(BulkRejection::Store(e.to_string()));
            }
        }
    }

    tx.commit().await?;
    Ok(outcome)
}

/// Validates and inserts one bulk item on an open savepoint.
///
/// The outer `Err` is a database failure; the inner `Err` is a rule rejection.
async fn insert_bulk_item(
    conn: &mut PgConnection,
    customer: &NewCustomer,
) -> Result<Result<CustomerRow, BulkRejection>, sqlx::Error> {
    let taken = match email_exists(&mut *conn, &customer.email).await {
        Ok(taken) => taken,
        Err(DbError::Sqlx(e)) => return Err(e),
        Err(other) => return Ok(Err(BulkRejection::Store(other.to_string()))),
    };

    if let Err(rejection) = BulkRejection::check(customer, taken) {
        return Ok(Err(rejection));
    }

    match insert_customer(&mut *conn, customer).await {
        Ok(row) => Ok(Ok(row)),
        Err(e) if is_unique_violation(&e) => {
            Ok(Err(BulkRejection::DuplicateEmail(customer.email.clone())))
        }
        Err(e) => Err(e),
    }
}
