use async_graphql::{Context, Object, Result};
use crm_core::{NewCustomer, NewOrder, NewProduct, RestockPolicy};
use sqlx::PgPool;

use super::error::{db_error, validation_error};
use super::types::{
    BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload, CreateProductPayload,
    Customer, CustomerInput, OrderInput, Product, ProductInput, UpdateLowStockProductsPayload,
};

pub const CUSTOMER_CREATED: &str = "Customer created successfully";

#[must_use]
pub fn restock_message(updated: usize) -> String {
    format!("Restocked {updated} low-stock product(s)")
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CustomerInput,
    ) -> Result<CreateCustomerPayload> {
        let pool = ctx.data::<PgPool>()?;
        let customer = NewCustomer::from(input);
        let row = crm_db::create_customer(pool, &customer)
            .await
            .map_err(db_error)?;

        tracing::info!(customer_id = row.id, "customer created");
        Ok(CreateCustomerPayload {
            customer: row.into(),
            message: CUSTOMER_CREATED.to_string(),
        })
    }

    /// Creates each valid customer; invalid ones are reported in `errors`.
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CustomerInput>,
    ) -> Result<BulkCreateCustomersPayload> {
        let pool = ctx.data::<PgPool>()?;
        let customers: Vec<NewCustomer> = input.into_iter().map(NewCustomer::from).collect();
        let outcome = crm_db::bulk_create_customers(pool, &customers)
            .await
            .map_err(db_error)?;

        tracing::info!(
            created = outcome.created.len(),
            rejected = outcome.errors.len(),
            "bulk customer create finished"
        );
        Ok(BulkCreateCustomersPayload {
            customers: outcome.created.into_iter().map(Customer::from).collect(),
            errors: outcome.errors.iter().map(ToString::to_string).collect(),
        })
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: ProductInput,
    ) -> Result<CreateProductPayload> {
        let pool = ctx.data::<PgPool>()?;
        let product = NewProduct {
            name: input.name,
            price: input.price,
            stock: input.stock,
        };
        let row = crm_db::create_product(pool, &product)
            .await
            .map_err(db_error)?;

        Ok(CreateProductPayload {
            product: row.into(),
        })
    }

    async fn create_order(&self, ctx: &Context<'_>, input: OrderInput) -> Result<CreateOrderPayload> {
        let pool = ctx.data::<PgPool>()?;
        let product_ids: Vec<&str> = input.product_ids.iter().map(|id| id.as_str()).collect();
        let order = NewOrder::from_raw(&input.customer_id, &product_ids, input.order_date)
            .map_err(|e| validation_error(&e))?;
        let row = crm_db::create_order(pool, &order).await.map_err(db_error)?;

        tracing::info!(order_id = row.id, total = %row.total_amount, "order created");
        Ok(CreateOrderPayload { order: row.into() })
    }

    /// Adds the configured amount to every product below the stock threshold.
    async fn update_low_stock_products(
        &self,
        ctx: &Context<'_>,
    ) -> Result<UpdateLowStockProductsPayload> {
        let pool = ctx.data::<PgPool>()?;
        let policy = ctx.data::<RestockPolicy>()?;
        let rows = crm_db::restock_low_stock(pool, *policy)
            .await
            .map_err(db_error)?;

        tracing::info!(
            updated = rows.len(),
            threshold = policy.threshold,
            amount = policy.amount,
            "low-stock products restocked"
        );
        Ok(UpdateLowStockProductsPayload {
            message: restock_message(rows.len()),
            updated_products: rows.into_iter().map(Product::from).collect(),
        })
    }
}
