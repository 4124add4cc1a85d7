//! Database integration tests for orders, payments and designs.
//!
//! These tests require a `PostgreSQL` database in
//! `STOREFRONT_TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use printshop_core::{Email, OrderStatus, Price, ProductId};
use printshop_integration_tests::{create_product, create_user, test_pool, unique};
use printshop_storefront::db::{DesignRepository, OrderRepository, ProductRepository};
use printshop_storefront::models::{DeliveryDetails, DraftItem, OrderDraft, ProductInput};
use printshop_storefront::services::cart::{Cart, summarize};
use printshop_storefront::services::checkout::{CheckoutForm, create_order_from_cart};
use printshop_storefront::services::designs::{DesignSubmission, save_design};
use printshop_storefront::services::media::MediaStorage;
use printshop_storefront::services::payment::mark_order_paid;
use sqlx::PgPool;

fn delivery(email: &str) -> DeliveryDetails {
    DeliveryDetails {
        full_name: "Sam Lee".to_string(),
        email: Email::parse(email).unwrap(),
        address_line1: "1 High Street".to_string(),
        city: "Leeds".to_string(),
        postcode: "LS1 1AA".to_string(),
        country: "United Kingdom".to_string(),
    }
}

async fn orders_for(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_checkout_snapshots_prices_and_totals() {
    let pool = test_pool().await;
    let tee = create_product(&pool, Price::from_minor(999)).await;
    let bag = create_product(&pool, Price::from_minor(500)).await;

    let mut cart = Cart::new();
    cart.add(tee.id, 2);
    cart.add(bag.id, 1);

    let email = format!("{}@example.com", unique("buyer"));
    let order = create_order_from_cart(&pool, &cart, None, delivery(&email))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Price::from_minor(2498));

    let items = OrderRepository::new(&pool).items(order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].subtotal(), Price::from_minor(1998));
    assert_eq!(items[1].subtotal(), Price::from_minor(500));

    // Later price changes don't touch the order
    let mut input = ProductInput::from(&tee);
    input.price = Price::from_minor(10_000);
    ProductRepository::new(&pool).update(tee.id, &input).await.unwrap();

    let items = OrderRepository::new(&pool).items(order.id).await.unwrap();
    assert_eq!(items[0].unit_price, Price::from_minor(999));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_failed_item_insert_leaves_no_order() {
    let pool = test_pool().await;
    let tee = create_product(&pool, Price::from_minor(999)).await;
    let email = format!("{}@example.com", unique("atomic"));

    // The second item points at a product that doesn't exist
    let draft = OrderDraft {
        user_id: None,
        delivery: delivery(&email),
        total: Price::from_minor(999),
        items: vec![
            DraftItem {
                product_id: tee.id,
                qty: 1,
                unit_price: tee.price,
            },
            DraftItem {
                product_id: ProductId::new(i32::MAX),
                qty: 1,
                unit_price: Price::from_minor(100),
            },
        ],
    };

    assert!(OrderRepository::new(&pool).create_with_items(&draft).await.is_err());
    assert_eq!(orders_for(&pool, &email).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_blank_delivery_form_creates_no_order() {
    let pool = test_pool().await;
    let errors = CheckoutForm::default().validate().unwrap_err();
    assert_eq!(errors.len(), 6);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders WHERE email = ''")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_deleted_product_fails_pricing() {
    let pool = test_pool().await;
    let tee = create_product(&pool, Price::from_minor(999)).await;
    let mut cart = Cart::new();
    cart.add(tee.id, 1);

    assert!(ProductRepository::new(&pool).delete(tee.id).await.unwrap());
    assert!(summarize(&cart, &ProductRepository::new(&pool)).await.is_err());
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_paying_twice_stays_paid() {
    let pool = test_pool().await;
    let tee = create_product(&pool, Price::from_minor(1500)).await;
    let mut cart = Cart::new();
    cart.add(tee.id, 1);
    let email = format!("{}@example.com", unique("pay"));
    let order = create_order_from_cart(&pool, &cart, None, delivery(&email))
        .await
        .unwrap();

    let first = mark_order_paid(&pool, order.id).await.unwrap();
    let second = mark_order_paid(&pool, order.id).await.unwrap();

    assert_eq!(first.status, OrderStatus::Paid);
    assert_eq!(second.status, OrderStatus::Paid);
    assert_eq!(second.total, order.total);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_payment_never_unships() {
    let pool = test_pool().await;
    let tee = create_product(&pool, Price::from_minor(1500)).await;
    let mut cart = Cart::new();
    cart.add(tee.id, 1);
    let email = format!("{}@example.com", unique("ship"));
    let order = create_order_from_cart(&pool, &cart, None, delivery(&email))
        .await
        .unwrap();

    let orders = OrderRepository::new(&pool);
    orders.set_status(order.id, OrderStatus::Shipped).await.unwrap();

    let after = mark_order_paid(&pool, order.id).await.unwrap();
    assert_eq!(after.status, OrderStatus::Shipped);
}

// ============================================================================
// Designs
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_malformed_preview_keeps_design() {
    let pool = test_pool().await;
    let user = create_user(&pool, false).await;
    let product = create_product(&pool, Price::from_minor(1500)).await;
    let media = MediaStorage::new(std::env::temp_dir().join(unique("printshop-media-")));

    let design = save_design(
        &DesignRepository::new(&pool),
        &media,
        DesignSubmission {
            user_id: user.id,
            product_id: product.id,
            design_data: r#"{"elements":[]}"#.to_string(),
            preview_data_url: "data:image/png;base64,@@not base64@@".to_string(),
            size: None,
        },
    )
    .await
    .unwrap();

    let stored = DesignRepository::new(&pool)
        .get_by_id(design.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.design.design_data, r#"{"elements":[]}"#);
    assert_eq!(stored.design.preview, None);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_my_designs_lists_only_own_newest_first() {
    let pool = test_pool().await;
    let owner = create_user(&pool, false).await;
    let other = create_user(&pool, false).await;
    let product = create_product(&pool, Price::from_minor(1500)).await;
    let media = MediaStorage::new(std::env::temp_dir().join(unique("printshop-media-")));
    let repo = DesignRepository::new(&pool);

    let mut saved = Vec::new();
    for user in [&owner, &owner, &other] {
        let design = save_design(
            &repo,
            &media,
            DesignSubmission {
                user_id: user.id,
                product_id: product.id,
                design_data: "{}".to_string(),
                preview_data_url: "not a data url".to_string(),
                size: None,
            },
        )
        .await
        .unwrap();
        saved.push(design.id);
    }

    let mine: Vec<_> = repo
        .list_newest(Some(owner.id))
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.design.id)
        .collect();
    assert_eq!(mine, vec![saved[1], saved[0]]);
}
