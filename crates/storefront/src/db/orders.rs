//! Order repository.
//!
//! Orders are the only multi-row write in the storefront: the header and its
//! items are inserted in one transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use printshop_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::{RepositoryError, column_u32};
use crate::models::{DeliveryDetails, Order, OrderDraft, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, full_name, email, address_line1, city, postcode, \
     country, total_amount, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    full_name: String,
    email: String,
    address_line1: String,
    city: String,
    postcode: String,
    country: String,
    total_amount: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            delivery: DeliveryDetails {
                full_name: row.full_name,
                email,
                address_line1: row.address_line1,
                city: row.city,
                postcode: row.postcode,
                country: row.country,
            },
            total: row.total_amount,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: Option<i32>,
    product_name: Option<String>,
    qty: i32,
    unit_price: Price,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            qty: column_u32(row.qty, "qty")?,
            unit_price: row.unit_price,
        })
    }
}

/// Repository for orders and order items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write an order header and all of its items atomically.
    ///
    /// The order starts as `PENDING`. If any item insert fails the whole
    /// transaction is rolled back and no order exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_with_items(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO shop.orders \
                 (user_id, full_name, email, address_line1, city, postcode, country, \
                  total_amount, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(draft.user_id)
        .bind(&draft.delivery.full_name)
        .bind(&draft.delivery.email)
        .bind(&draft.delivery.address_line1)
        .bind(&draft.delivery.city)
        .bind(&draft.delivery.postcode)
        .bind(&draft.delivery.country)
        .bind(draft.total)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        for item in &draft.items {
            let qty = i32::try_from(item.qty).map_err(|_| {
                RepositoryError::Conflict(format!("quantity {} is too large", item.qty))
            })?;

            sqlx::query(
                "INSERT INTO shop.order_items (order_id, product_id, qty, unit_price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(qty)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    /// Get an order header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Items of an order, in insertion order, with current product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT i.id, i.order_id, i.product_id, p.name AS product_name, i.qty, i.unit_price \
             FROM shop.order_items i \
             LEFT JOIN shop.products p ON p.id = i.product_id \
             WHERE i.order_id = $1 \
             ORDER BY i.id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// List orders newest first, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_newest(&self, limit: Option<i64>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Record a simulated payment.
    ///
    /// Only a `PENDING` order changes; paying an already paid or shipped
    /// order leaves it as it is. Returns the order as stored afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_paid(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query("UPDATE shop.orders SET status = $2 WHERE id = $1 AND status = $3")
            .bind(id)
            .bind(OrderStatus::Paid)
            .bind(OrderStatus::Pending)
            .execute(self.pool)
            .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set an order's status (staff action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_row_rejects_negative_qty() {
        let row = OrderItemRow {
            id: 1,
            order_id: 1,
            product_id: None,
            product_name: None,
            qty: -2,
            unit_price: Price::from_minor(100),
        };
        assert!(matches!(
            OrderItem::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_order_row_parses_email() {
        let row = OrderRow {
            id: 9,
            user_id: None,
            full_name: "Sam Lee".to_string(),
            email: "sam@example.com".to_string(),
            address_line1: "1 High St".to_string(),
            city: "Leeds".to_string(),
            postcode: "LS1 1AA".to_string(),
            country: "UK".to_string(),
            total_amount: Price::from_minor(2498),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        let order = Order::try_from(row).ok();
        assert_eq!(order.map(|o| o.delivery.email.into_inner()), Some("sam@example.com".to_string()));
    }
}
