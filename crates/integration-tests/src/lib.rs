//! Integration tests for Printshop.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests: a scratch database, migrated on connect
//! STOREFRONT_TEST_DATABASE_URL=postgres://localhost/printshop_test \
//!     cargo test -p printshop-integration-tests -- --ignored
//!
//! # HTTP tests additionally need a running storefront
//! STOREFRONT_TEST_BASE_URL=http://localhost:3000 \
//!     cargo test -p printshop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `database` - Repository and service behaviour against `PostgreSQL`
//! - `storefront_http` - End-to-end flows through a running server

use printshop_core::{Price, PrintArea, UserId};
use printshop_storefront::db::{MIGRATOR, ProductRepository, UserRepository, create_pool};
use printshop_storefront::models::{Product, ProductInput, User};
use printshop_storefront::services::auth::AuthService;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if no database URL is configured or the database is unreachable.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_TEST_DATABASE_URL or DATABASE_URL must be set");

    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Base URL of a running storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps cookies and does not follow redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[allow(clippy::expect_used)]
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A name no other test run will use.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Insert a product with the given price.
///
/// # Panics
///
/// Panics if the insert fails.
#[allow(clippy::expect_used)]
pub async fn create_product(pool: &PgPool, price: Price) -> Product {
    ProductRepository::new(pool)
        .create(&ProductInput {
            name: unique("Test tee "),
            price,
            description: String::new(),
            image: None,
            template_image: None,
            template_size: None,
            print_area: PrintArea::COLUMN_DEFAULT,
        })
        .await
        .expect("Failed to create product")
}

/// Create an account with [`TEST_PASSWORD`].
///
/// # Panics
///
/// Panics if the account cannot be created.
#[allow(clippy::expect_used)]
pub async fn create_user(pool: &PgPool, is_staff: bool) -> User {
    AuthService::new(pool)
        .create_user(&unique("user"), None, TEST_PASSWORD, is_staff)
        .await
        .expect("Failed to create user")
}

/// Re-read a user's active flag.
///
/// # Panics
///
/// Panics if the user doesn't exist.
#[allow(clippy::expect_used)]
pub async fn is_active(pool: &PgPool, id: UserId) -> bool {
    UserRepository::new(pool)
        .get_by_id(id)
        .await
        .expect("Failed to load user")
        .expect("User missing")
        .is_active
}
