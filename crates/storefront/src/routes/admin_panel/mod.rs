//! Staff admin panel.
//!
//! Every handler takes [`RequireStaff`](crate::middleware::RequireStaff), so
//! anonymous visitors are sent to the login page and logged-in non-staff get
//! a 403.
//!
//! ```text
//! GET       /admin-panel/                              - Dashboard
//! GET       /admin-panel/products/                     - Product list
//! GET, POST /admin-panel/products/create/              - Create product
//! GET, POST /admin-panel/products/{id}/edit/           - Edit product
//! GET, POST /admin-panel/products/{id}/delete/         - Confirm / delete
//! GET       /admin-panel/orders/                       - Order list
//! GET       /admin-panel/orders/{id}/                  - Order detail
//! POST      /admin-panel/orders/{id}/status/           - Set order status
//! GET       /admin-panel/designs/                      - Design list
//! GET       /admin-panel/designs/{id}/                 - Design detail
//! GET       /admin-panel/users/                        - User list
//! POST      /admin-panel/users/{id}/toggle-active/     - Toggle active flag
//! ```

pub mod dashboard;
pub mod designs;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin panel router.
///
/// Paths are spelled out rather than nested so every page keeps its trailing
/// slash.
pub fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    let products = Router::new()
        .route("/admin-panel/products/", get(products::index))
        .route(
            "/admin-panel/products/create/",
            get(products::create_page).post(products::create),
        )
        .route(
            "/admin-panel/products/{id}/edit/",
            get(products::edit_page).post(products::update),
        )
        .route(
            "/admin-panel/products/{id}/delete/",
            get(products::confirm_delete).post(products::delete),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/admin-panel/", get(dashboard::dashboard))
        .route("/admin-panel/orders/", get(orders::index))
        .route("/admin-panel/orders/{id}/", get(orders::show))
        .route("/admin-panel/orders/{id}/status/", post(orders::update_status))
        .route("/admin-panel/designs/", get(designs::index))
        .route("/admin-panel/designs/{id}/", get(designs::show))
        .route("/admin-panel/users/", get(users::index))
        .route(
            "/admin-panel/users/{id}/toggle-active/",
            post(users::toggle_active),
        )
        .merge(products)
}
