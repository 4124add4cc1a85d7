//! End-to-end tests against a running storefront.
//!
//! These tests require the storefront at `STOREFRONT_TEST_BASE_URL` and its
//! database in `STOREFRONT_TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use printshop_core::Price;
use printshop_integration_tests::{
    TEST_PASSWORD, create_product, create_user, http_client, is_active, storefront_base_url,
    test_pool,
};
use printshop_storefront::db::UserRepository;
use reqwest::{Client, StatusCode};

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn login(client: &Client, username: &str) {
    let response = client
        .post(format!("{}/login/", storefront_base_url()))
        .form(&[("username", username), ("password", TEST_PASSWORD), ("next", "/")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health_endpoints() {
    let client = http_client();
    let base = storefront_base_url();

    let live = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "ok");

    let ready = client.get(format!("{base}/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_unknown_product_is_not_found() {
    let response = http_client()
        .get(format!("{}/product/2147483647/", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart and checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_cart_add_merges_and_remove_drops() {
    let pool = test_pool().await;
    let product = create_product(&pool, Price::from_minor(999)).await;
    let client = http_client();
    let base = storefront_base_url();
    let add = format!("{base}/cart/add/{}/", product.id);

    for qty in ["2", "not a number"] {
        let response = client.post(&add).form(&[("qty", qty)]).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/cart/");
    }

    let cart = client.get(format!("{base}/cart/")).send().await.unwrap();
    let body = cart.text().await.unwrap();
    assert!(body.contains(&product.name));
    assert!(body.contains("29.97"), "3 x 9.99 expected in cart page");

    client
        .post(format!("{base}/cart/remove/{}/", product.id))
        .send()
        .await
        .unwrap();
    let body = client.get(format!("{base}/cart/")).send().await.unwrap().text().await.unwrap();
    assert!(!body.contains(&product.name));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_empty_cart_checkout_redirects_to_cart() {
    let response = http_client()
        .get(format!("{}/checkout/", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart/");
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_checkout_pay_and_thank_you() {
    let pool = test_pool().await;
    let product = create_product(&pool, Price::from_minor(1500)).await;
    let client = http_client();
    let base = storefront_base_url();

    client
        .post(format!("{base}/cart/add/{}/", product.id))
        .form(&[("qty", "1")])
        .send()
        .await
        .unwrap();

    // Blank delivery details re-render the form
    let invalid = client
        .post(format!("{base}/checkout/"))
        .form(&[("full_name", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::OK);

    let placed = client
        .post(format!("{base}/checkout/"))
        .form(&[
            ("full_name", "Sam Lee"),
            ("email", "sam@example.com"),
            ("address_line1", "1 High Street"),
            ("city", "Leeds"),
            ("postcode", "LS1 1AA"),
            ("country", "United Kingdom"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(placed.status(), StatusCode::SEE_OTHER);
    let payment_path = location(&placed);
    assert!(payment_path.starts_with("/payment/"));

    // Placing the order empties the cart
    let empty = client.get(format!("{base}/checkout/")).send().await.unwrap();
    assert_eq!(location(&empty), "/cart/");

    let paid = client
        .post(format!("{base}{payment_path}"))
        .send()
        .await
        .unwrap();
    assert_eq!(paid.status(), StatusCode::SEE_OTHER);
    let thank_you = location(&paid);
    assert!(thank_you.starts_with("/thank-you/"));

    let page = client.get(format!("{base}{thank_you}")).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("15.00"));
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_anonymous_admin_redirects_to_login() {
    let response = http_client()
        .get(format!("{}/admin-panel/", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login/?next="));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_customer_is_forbidden_from_admin() {
    let pool = test_pool().await;
    let customer = create_user(&pool, false).await;
    let client = http_client();
    login(&client, &customer.username).await;

    let response = client
        .get(format!("{}/admin-panel/orders/", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_staff_sees_dashboard() {
    let pool = test_pool().await;
    let staff = create_user(&pool, true).await;
    let client = http_client();
    login(&client, &staff.username).await;

    let response = client
        .get(format!("{}/admin-panel/", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_customise_requires_login() {
    let pool = test_pool().await;
    let product = create_product(&pool, Price::from_minor(1500)).await;

    let response = http_client()
        .get(format!("{}/customise/{}/", storefront_base_url(), product.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login/"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_staff_cannot_deactivate_themselves() {
    let pool = test_pool().await;
    let staff = create_user(&pool, true).await;
    let client = http_client();
    let base = storefront_base_url();
    login(&client, &staff.username).await;

    let response = client
        .post(format!("{base}/admin-panel/users/{}/toggle-active/", staff.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin-panel/users/");
    assert!(is_active(&pool, staff.id).await);

    // Toggling someone else still works
    let customer = create_user(&pool, false).await;
    client
        .post(format!("{base}/admin-panel/users/{}/toggle-active/", customer.id))
        .send()
        .await
        .unwrap();
    assert!(!is_active(&pool, customer.id).await);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_deactivated_user_loses_session() {
    let pool = test_pool().await;
    let customer = create_user(&pool, false).await;
    let client = http_client();
    let base = storefront_base_url();
    login(&client, &customer.username).await;

    let before = client.get(format!("{base}/my-designs/")).send().await.unwrap();
    assert_eq!(before.status(), StatusCode::OK);

    UserRepository::new(&pool)
        .set_active(customer.id, false)
        .await
        .unwrap();

    let after = client.get(format!("{base}/my-designs/")).send().await.unwrap();
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert!(location(&after).starts_with("/login/?next="));

    // The session was ended, so reactivating doesn't restore access
    UserRepository::new(&pool)
        .set_active(customer.id, true)
        .await
        .unwrap();
    let again = client.get(format!("{base}/my-designs/")).send().await.unwrap();
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
}
