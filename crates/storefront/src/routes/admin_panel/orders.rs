//! Admin order views and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use printshop_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireStaff};
use crate::models::{Order, OrderItem};
use crate::state::AppState;

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders_list.html")]
pub struct OrdersListTemplate {
    pub ctx: PageContext,
    pub orders: Vec<Order>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders_detail.html")]
pub struct OrderDetailTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub statuses: [OrderStatus; 3],
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// List all orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_newest(None).await?;
    Ok(OrdersListTemplate { ctx, orders })
}

/// Show an order with its items.
#[instrument(skip(state, _staff, ctx))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = orders.items(id).await?;

    Ok(OrderDetailTemplate {
        ctx,
        order,
        items,
        statuses: OrderStatus::ALL,
    })
}

/// Set an order's status. Any transition is allowed.
#[instrument(skip(state, staff, form), fields(staff_id = %staff.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status = form
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    OrderRepository::new(state.pool()).set_status(id, status).await?;
    tracing::info!(order_id = %id, status = %status, "Order status changed");

    Ok(Redirect::to(&format!("/admin-panel/orders/{id}/")))
}
