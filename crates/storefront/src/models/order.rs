//! Orders and their line items.

use chrono::{DateTime, Utc};

use printshop_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// Validated delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub full_name: String,
    pub email: Email,
    pub address_line1: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Owning user; `None` for guest checkouts and removed accounts.
    pub user_id: Option<UserId>,
    pub delivery: DeliveryDetails,
    /// Fixed at creation and never recomputed.
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    /// Current product name, if the product still exists.
    pub product_name: Option<String>,
    pub qty: u32,
    /// Price paid per unit, captured at checkout.
    pub unit_price: Price,
}

impl OrderItem {
    /// Quantity times the captured unit price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.qty)
    }
}

/// An order ready to be written: header fields plus one item per cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub delivery: DeliveryDetails,
    pub total: Price,
    pub items: Vec<DraftItem>,
}

/// A line of an [`OrderDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftItem {
    pub product_id: ProductId,
    pub qty: u32,
    pub unit_price: Price,
}
