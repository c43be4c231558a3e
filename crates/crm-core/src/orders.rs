//! Order aggregation rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::validation::ValidationError;

/// A validated request to create an order.
///
/// `product_ids` holds only the ids that parsed; `requested_products` is the
/// number of ids the client sent, so unparseable or repeated ids still count
/// against the resolved total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub product_ids: Vec<i64>,
    pub requested_products: usize,
    pub order_date: Option<DateTime<Utc>>,
}

impl NewOrder {
    /// Builds an order request from raw API identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCustomerId`] if `customer_id` is not a
    /// row id.
    pub fn from_raw<S: AsRef<str>>(
        customer_id: &str,
        product_ids: &[S],
        order_date: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let customer_id = parse_id(customer_id).ok_or(ValidationError::InvalidCustomerId)?;
        Ok(Self {
            customer_id,
            product_ids: product_ids
                .iter()
                .filter_map(|raw| parse_id(raw.as_ref()))
                .collect(),
            requested_products: product_ids.len(),
            order_date,
        })
    }
}

/// Parses an API identifier into a row id.
///
/// Returns `None` for anything that is not a positive integer.
#[must_use]
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Reconciles the requested product ids with the products that resolved.
///
/// `requested` counts ids as sent, duplicates included, so a repeated id is
/// reported as invalid.
///
/// # Errors
///
/// Returns [`ValidationError::NoValidProducts`] when nothing resolved, or
/// [`ValidationError::InvalidProductIds`] when only some did.
pub fn check_resolved_products(requested: usize, resolved: usize) -> Result<(), ValidationError> {
    if resolved == 0 {
        return Err(ValidationError::NoValidProducts);
    }
    if resolved != requested {
        return Err(ValidationError::InvalidProductIds);
    }
    Ok(())
}

/// Sums product prices exactly.
#[must_use]
pub fn order_total<I>(prices: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    prices.into_iter().sum()
}
