//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{DesignRepository, OrderRepository, ProductRepository, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireStaff};
use crate::models::Order;
use crate::state::AppState;

/// Orders shown on the dashboard.
const RECENT_ORDERS: i64 = 5;

/// Dashboard counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardMetrics {
    pub products: i64,
    pub orders: i64,
    pub designs: i64,
    pub users: i64,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub metrics: DashboardMetrics,
    /// Most recent orders, newest first.
    pub orders: Vec<Order>,
}

/// Display the dashboard.
#[instrument(skip_all, fields(staff_id = %staff.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let products = ProductRepository::new(pool);
    let orders = OrderRepository::new(pool);
    let designs = DesignRepository::new(pool);
    let users = UserRepository::new(pool);

    let (product_count, order_count, design_count, user_count, recent) = tokio::try_join!(
        products.count(),
        orders.count(),
        designs.count(),
        users.count(),
        orders.list_newest(Some(RECENT_ORDERS)),
    )?;

    Ok(DashboardTemplate {
        ctx,
        metrics: DashboardMetrics {
            products: product_count,
            orders: order_count,
            designs: design_count,
            users: user_count,
        },
        orders: recent,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use printshop_core::UserId;

    use super::*;
    use crate::models::CurrentUser;

    #[test]
    fn test_dashboard_renders_inside_panel_layout() {
        let template = DashboardTemplate {
            ctx: PageContext {
                user: Some(CurrentUser {
                    id: UserId::new(1),
                    username: "staff".to_string(),
                    is_staff: true,
                }),
                cart_count: 0,
            },
            metrics: DashboardMetrics {
                products: 3,
                orders: 2,
                designs: 1,
                users: 4,
            },
            orders: Vec::new(),
        };

        let html = template.render().unwrap();
        assert!(html.contains("/admin-panel/orders/"));
        assert!(html.contains("staff"));
    }
}
