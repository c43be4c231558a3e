//! GraphQL object, input, and payload types.
//!
//! Row ids are exposed as plain integer strings in `ID` fields.

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use crm_core::NewCustomer;
use crm_db::{
    CustomerFilters, CustomerRow, OrderFilters, OrderRow, ProductFilters, ProductRow,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::error::{db_error, internal_error};

fn row_id(id: i64) -> ID {
    ID(id.to_string())
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, SimpleObject)]
pub struct Customer {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row_id(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Product {
    pub id: ID,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row_id(row.id),
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Order {
    pub id: ID,
    #[graphql(skip)]
    pub order_id: i64,
    #[graphql(skip)]
    pub customer_id: i64,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row_id(row.id),
            order_id: row.id,
            customer_id: row.customer_id,
            total_amount: row.total_amount,
            order_date: row.order_date,
        }
    }
}

#[ComplexObject]
impl Order {
    async fn customer(&self, ctx: &Context<'_>) -> Result<Customer> {
        let pool = ctx.data::<PgPool>()?;
        match crm_db::get_customer(pool, self.customer_id)
            .await
            .map_err(db_error)?
        {
            Some(row) => Ok(row.into()),
            None => Err(internal_error(
                "order customer",
                &format!("order {} references missing customer {}", self.order_id, self.customer_id),
            )),
        }
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let pool = ctx.data::<PgPool>()?;
        let rows = crm_db::list_order_products(pool, self.order_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, InputObject)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerInput> for NewCustomer {
    fn from(input: CustomerInput) -> Self {
        NewCustomer::new(input.name, input.email, input.phone)
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[graphql(default)]
    pub stock: i32,
}

#[derive(Debug, Clone, InputObject)]
pub struct OrderInput {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    /// Defaults to the time the order is created.
    pub order_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, InputObject)]
pub struct CustomerFilter {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    /// Phone prefix, e.g. `+1`.
    pub phone_pattern: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
}

impl CustomerFilter {
    pub fn as_db(&self) -> CustomerFilters<'_> {
        CustomerFilters {
            name_icontains: self.name_icontains.as_deref(),
            email_icontains: self.email_icontains.as_deref(),
            phone_prefix: self.phone_pattern.as_deref(),
            created_at_gte: self.created_at_gte,
            created_at_lte: self.created_at_lte,
        }
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
}

impl ProductFilter {
    pub fn as_db(&self) -> ProductFilters<'_> {
        ProductFilters {
            name_icontains: self.name_icontains.as_deref(),
            price_gte: self.price_gte,
            price_lte: self.price_lte,
            stock_gte: self.stock_gte,
            stock_lte: self.stock_lte,
        }
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct OrderFilter {
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<ID>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Returns `None` when `product_id` is set but is not a row id, in which
    /// case nothing can match.
    pub fn as_db(&self) -> Option<OrderFilters<'_>> {
        let product_id = match &self.product_id {
            Some(raw) => Some(crm_core::parse_id(raw)?),
            None => None,
        };

        Some(OrderFilters {
            customer_name: self.customer_name.as_deref(),
            product_name: self.product_name.as_deref(),
            product_id,
            total_amount_gte: self.total_amount_gte,
            total_amount_lte: self.total_amount_lte,
            order_date_gte: self.order_date_gte,
            order_date_lte: self.order_date_lte,
        })
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: Customer,
    pub message: String,
}

#[derive(Debug, SimpleObject)]
pub struct BulkCreateCustomersPayload {
    pub customers: Vec<Customer>,
    pub errors: Vec<String>,
}

#[derive(Debug, SimpleObject)]
pub struct CreateProductPayload {
    pub product: Product,
}

#[derive(Debug, SimpleObject)]
pub struct CreateOrderPayload {
    pub order: Order,
}

#[derive(Debug, SimpleObject)]
pub struct UpdateLowStockProductsPayload {
    pub message: String,
    pub updated_products: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_filter_rejects_non_numeric_product_id() {
        let filter = OrderFilter {
            product_id: Some(ID("abc".to_string())),
            ..OrderFilter::default()
        };
        assert!(filter.as_db().is_none());
    }

    #[test]
    fn order_filter_passes_parsed_product_id() {
        let filter = OrderFilter {
            product_id: Some(ID("7".to_string())),
            customer_name: Some("ali".to_string()),
            ..OrderFilter::default()
        };
        let db = filter.as_db().expect("valid filter");
        assert_eq!(db.product_id, Some(7));
        assert_eq!(db.customer_name, Some("ali"));
    }

    #[test]
    fn customer_filter_maps_phone_pattern_to_prefix() {
        let filter = CustomerFilter {
            phone_pattern: Some("+1".to_string()),
            ..CustomerFilter::default()
        };
        assert_eq!(filter.as_db().phone_prefix, Some("+1"));
    }

    #[test]
    fn customer_input_treats_empty_phone_as_absent() {
        let input = CustomerInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: Some(String::new()),
        };
        let customer = NewCustomer::from(input);
        assert_eq!(customer.phone(), None);
    }
}
