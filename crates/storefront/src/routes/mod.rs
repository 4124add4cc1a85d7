//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET       /                          - Home page (newest products)
//! GET       /shop/                     - Catalog
//! GET       /about/                    - About page
//! GET       /product/{id}/             - Product detail
//!
//! # Cart (session)
//! GET       /cart/                     - Cart summary
//! POST      /cart/add/{id}/            - Add product (optional qty)
//! GET, POST /cart/remove/{id}/         - Remove product
//!
//! # Checkout
//! GET, POST /checkout/                 - Delivery form / create order
//! GET, POST /payment/{order_id}/       - Simulated payment
//! GET       /thank-you/{order_id}/     - Confirmation
//!
//! # Customiser (requires auth)
//! GET, POST /customise/{id}/           - Customiser / save design
//! POST      /save-design/{id}/         - Save design
//! GET       /my-designs/               - Saved designs
//!
//! # Auth (POST rate limited)
//! GET, POST /register/                 - Register
//! GET, POST /login/                    - Login
//! GET, POST /logout/                   - Logout
//!
//! # Admin panel (requires staff)
//! *         /admin-panel/...           - See [`admin_panel`]
//! ```

pub mod admin_panel;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod customise;
pub mod pages;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Only form submissions count against the rate limit.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login/",
            post(auth::login)
                .layer(auth_rate_limiter())
                .get(auth::login_page),
        )
        .route(
            "/register/",
            post(auth::register)
                .layer(auth_rate_limiter())
                .get(auth::register_page),
        )
        .route("/logout/", get(auth::logout).post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(cart::show))
        .route("/cart/add/{id}/", post(cart::add))
        .route("/cart/remove/{id}/", get(cart::remove).post(cart::remove))
}

/// Create the checkout and payment routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout/", get(checkout::checkout_page).post(checkout::checkout))
        .route(
            "/payment/{order_id}/",
            get(checkout::payment_page).post(checkout::pay),
        )
        .route("/thank-you/{order_id}/", get(checkout::thank_you))
}

/// Create the customiser routes router.
///
/// Design submissions carry a base64 preview image, so the body limit follows
/// the upload limit rather than axum's default.
pub fn customise_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/customise/{id}/",
            get(customise::customise_page).post(customise::save),
        )
        .route("/save-design/{id}/", post(customise::save))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route("/my-designs/", get(customise::my_designs))
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/shop/", get(pages::shop))
        .route("/about/", get(pages::about))
        .route("/product/{id}/", get(pages::product_detail))
        .merge(cart_routes())
        .merge(checkout_routes())
        .merge(customise_routes(max_upload_bytes))
        .merge(auth_routes())
        .merge(admin_panel::admin_routes(max_upload_bytes))
}
