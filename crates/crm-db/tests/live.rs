//! Live integration tests for crm-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` pointing at a Postgres server.

use std::str::FromStr;

use crm_core::{BulkRejection, NewCustomer, NewOrder, NewProduct, RestockPolicy, ValidationError};
use crm_db::{
    bulk_create_customers, create_customer, create_order, create_product, list_customers,
    list_customers_filtered, list_order_products, list_orders, list_orders_filtered,
    list_products_filtered, restock_low_stock, CustomerFilters, DbError, OrderFilters,
    ProductFilters,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_else(|e| panic!("bad decimal literal {s}: {e}"))
}

fn customer(name: &str, email: &str, phone: Option<&str>) -> NewCustomer {
    NewCustomer::new(name, email, phone.map(str::to_owned))
}

async fn insert_product(pool: &PgPool, name: &str, price: &str, stock: i32) -> i64 {
    create_product(
        pool,
        &NewProduct {
            name: name.to_string(),
            price: dec(price),
            stock,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("insert_product failed for '{name}': {e}"))
    .id
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query")
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_customer_persists_row(pool: PgPool) {
    let row = create_customer(&pool, &customer("Alice", "alice@example.com", Some("+12345678901")))
        .await
        .expect("create customer");

    assert_eq!(row.name, "Alice");
    assert_eq!(row.phone.as_deref(), Some("+12345678901"));
    assert_eq!(count(&pool, "customers").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_email_fails_without_writing(pool: PgPool) {
    create_customer(&pool, &customer("Alice", "alice@example.com", None))
        .await
        .expect("first insert");

    let err = create_customer(&pool, &customer("Other", "alice@example.com", None))
        .await
        .expect_err("duplicate must fail");

    assert!(matches!(
        err,
        DbError::Validation(ValidationError::DuplicateEmail)
    ));
    assert_eq!(count(&pool, "customers").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn bad_phone_fails_without_writing(pool: PgPool) {
    let err = create_customer(&pool, &customer("Bob", "bob@example.com", Some("123-45-6789")))
        .await
        .expect_err("bad phone must fail");

    assert!(matches!(err, DbError::Validation(ValidationError::InvalidPhone)));
    assert_eq!(count(&pool, "customers").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn bulk_create_keeps_valid_items_and_reports_failures_in_order(pool: PgPool) {
    create_customer(&pool, &customer("Existing", "taken@example.com", None))
        .await
        .expect("seed customer");

    let outcome = bulk_create_customers(
        &pool,
        &[
            customer("Carol", "carol@example.com", Some("123-456-7890")),
            customer("Dup", "taken@example.com", None),
            customer("Dave", "dave@example.com", None),
        ],
    )
    .await
    .expect("bulk create");

    let names: Vec<&str> = outcome.created.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Dave"]);
    assert_eq!(
        outcome.errors,
        vec![BulkRejection::DuplicateEmail("taken@example.com".to_string())]
    );
    assert_eq!(count(&pool, "customers").await, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn bulk_create_rejects_duplicates_within_the_batch(pool: PgPool) {
    let outcome = bulk_create_customers(
        &pool,
        &[
            customer("Erin", "erin@example.com", None),
            customer("Erin Again", "erin@example.com", None),
            customer("Frank", "frank@example.com", Some("nope")),
        ],
    )
    .await
    .expect("bulk create");

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(
        outcome.errors,
        vec![
            BulkRejection::DuplicateEmail("erin@example.com".to_string()),
            BulkRejection::InvalidPhone("nope".to_string()),
        ]
    );
    assert_eq!(count(&pool, "customers").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn bulk_create_survives_a_failed_insert_mid_batch(pool: PgPool) {
    let too_long = "x".repeat(300);
    let outcome = bulk_create_customers(
        &pool,
        &[
            customer("Gina", "gina@example.com", None),
            customer(&too_long, "long@example.com", None),
            customer("Hank", "hank@example.com", None),
        ],
    )
    .await
    .expect("bulk create");

    let names: Vec<&str> = outcome.created.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Gina", "Hank"]);
    assert_eq!(outcome.errors.len(), 1);
    assert!(
        matches!(&outcome.errors[0], BulkRejection::Store(msg) if msg.contains("value too long")),
        "unexpected errors: {:?}",
        outcome.errors
    );
    assert_eq!(count(&pool, "customers").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn customer_filters_match_substrings_case_insensitively(pool: PgPool) {
    create_customer(&pool, &customer("Alice Smith", "alice@example.com", Some("+15550001111")))
        .await
        .expect("alice");
    create_customer(&pool, &customer("Bob Jones", "bob@corp.test", Some("555-000-1111")))
        .await
        .expect("bob");

    let by_name = list_customers_filtered(
        &pool,
        CustomerFilters {
            name_icontains: Some("SMITH"),
            ..CustomerFilters::default()
        },
    )
    .await
    .expect("filter by name");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].email, "alice@example.com");

    let by_phone = list_customers_filtered(
        &pool,
        CustomerFilters {
            phone_prefix: Some("+1"),
            ..CustomerFilters::default()
        },
    )
    .await
    .expect("filter by phone");
    assert_eq!(by_phone.len(), 1);

    assert_eq!(list_customers(&pool).await.expect("list").len(), 2);
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_product_accepts_smallest_positive_price(pool: PgPool) {
    let row = create_product(
        &pool,
        &NewProduct {
            name: "Sticker".to_string(),
            price: dec("0.01"),
            stock: 0,
        },
    )
    .await
    .expect("create product");

    assert_eq!(row.price, dec("0.01"));
    assert_eq!(row.stock, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_product_rejects_zero_price(pool: PgPool) {
    let err = create_product(
        &pool,
        &NewProduct {
            name: "Free".to_string(),
            price: Decimal::ZERO,
            stock: 1,
        },
    )
    .await
    .expect_err("zero price must fail");

    assert!(matches!(
        err,
        DbError::Validation(ValidationError::NonPositivePrice)
    ));
    assert_eq!(count(&pool, "products").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn restock_only_touches_products_below_threshold(pool: PgPool) {
    let low = insert_product(&pool, "Low", "1.00", 3).await;
    insert_product(&pool, "Full", "1.00", 50).await;
    let empty = insert_product(&pool, "Empty", "1.00", 0).await;

    let updated = restock_low_stock(
        &pool,
        RestockPolicy {
            threshold: 10,
            amount: 10,
        },
    )
    .await
    .expect("restock");

    let summary: Vec<(i64, i32)> = updated.iter().map(|p| (p.id, p.stock)).collect();
    assert_eq!(summary, vec![(low, 13), (empty, 10)]);

    let still_full = list_products_filtered(
        &pool,
        ProductFilters {
            stock_gte: Some(50),
            ..ProductFilters::default()
        },
    )
    .await
    .expect("filter");
    assert_eq!(still_full.len(), 1);
    assert_eq!(still_full[0].name, "Full");
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_order_sums_product_prices(pool: PgPool) {
    let cust = create_customer(&pool, &customer("Gina", "gina@example.com", None))
        .await
        .expect("customer");
    let p1 = insert_product(&pool, "Book", "10.00", 5).await;
    let p2 = insert_product(&pool, "Pen", "5.50", 5).await;

    let order = create_order(
        &pool,
        &NewOrder {
            customer_id: cust.id,
            product_ids: vec![p1, p2],
            requested_products: 2,
            order_date: None,
        },
    )
    .await
    .expect("create order");

    assert_eq!(order.total_amount, dec("15.50"));
    assert_eq!(order.customer_id, cust.id);

    let linked: Vec<i64> = list_order_products(&pool, order.id)
        .await
        .expect("linked products")
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(linked, vec![p1, p2]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_order_with_unknown_product_writes_nothing(pool: PgPool) {
    let cust = create_customer(&pool, &customer("Hank", "hank@example.com", None))
        .await
        .expect("customer");
    let p1 = insert_product(&pool, "Lamp", "20.00", 1).await;
    let p2 = insert_product(&pool, "Bulb", "2.00", 1).await;

    let err = create_order(
        &pool,
        &NewOrder {
            customer_id: cust.id,
            product_ids: vec![p1, p2, 999],
            requested_products: 3,
            order_date: None,
        },
    )
    .await
    .expect_err("invalid product must fail");

    assert_eq!(err.to_string(), "Some product IDs are invalid");
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "order_products").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_order_rejects_unknown_customer_and_empty_products(pool: PgPool) {
    let p1 = insert_product(&pool, "Mug", "8.00", 1).await;

    let err = create_order(
        &pool,
        &NewOrder {
            customer_id: 4242,
            product_ids: vec![p1],
            requested_products: 1,
            order_date: None,
        },
    )
    .await
    .expect_err("unknown customer");
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::InvalidCustomerId)
    ));

    let cust = create_customer(&pool, &customer("Ivy", "ivy@example.com", None))
        .await
        .expect("customer");
    let err = create_order(
        &pool,
        &NewOrder {
            customer_id: cust.id,
            product_ids: vec![777],
            requested_products: 1,
            order_date: None,
        },
    )
    .await
    .expect_err("no products");
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::NoValidProducts)
    ));
    assert!(list_orders(&pool).await.expect("list").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_filters_follow_customer_and_product_links(pool: PgPool) {
    let jane = create_customer(&pool, &customer("Jane Doe", "jane@example.com", None))
        .await
        .expect("jane");
    let kim = create_customer(&pool, &customer("Kim", "kim@example.com", None))
        .await
        .expect("kim");
    let desk = insert_product(&pool, "Standing Desk", "300.00", 2).await;
    let chair = insert_product(&pool, "Chair", "120.00", 2).await;

    for (cust, products) in [(jane.id, vec![desk]), (kim.id, vec![chair])] {
        create_order(
            &pool,
            &NewOrder {
                customer_id: cust,
                requested_products: products.len(),
                product_ids: products,
                order_date: None,
            },
        )
        .await
        .expect("order");
    }

    let janes = list_orders_filtered(
        &pool,
        OrderFilters {
            customer_name: Some("doe"),
            ..OrderFilters::default()
        },
    )
    .await
    .expect("by customer");
    assert_eq!(janes.len(), 1);
    assert_eq!(janes[0].customer_id, jane.id);

    let desks = list_orders_filtered(
        &pool,
        OrderFilters {
            product_name: Some("desk"),
            total_amount_gte: Some(dec("200")),
            ..OrderFilters::default()
        },
    )
    .await
    .expect("by product");
    assert_eq!(desks.len(), 1);

    let chairs = list_orders_filtered(
        &pool,
        OrderFilters {
            product_id: Some(chair),
            ..OrderFilters::default()
        },
    )
    .await
    .expect("by product id");
    assert_eq!(chairs.len(), 1);
    assert_eq!(chairs[0].customer_id, kim.id);
}
