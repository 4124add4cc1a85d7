//! Simulated payment.
//!
//! No card details are collected or verified. Submitting the payment form
//! for an order marks it paid, and anyone holding the order id can do so.

use sqlx::PgPool;
use tracing::instrument;

use printshop_core::OrderId;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::Order;

/// Record a payment for an order.
///
/// Idempotent: paying a paid order leaves it paid, and a shipped order is
/// never moved back.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
#[instrument(skip(pool))]
pub async fn mark_order_paid(pool: &PgPool, order_id: OrderId) -> Result<Order, RepositoryError> {
    let order = OrderRepository::new(pool).mark_paid(order_id).await?;

    tracing::info!(status = %order.status, "Simulated payment recorded");
    Ok(order)
}
