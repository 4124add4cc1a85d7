//! Checkout: delivery form validation and order creation.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use printshop_core::{Email, Price, UserId};

use super::cart::{Cart, CartError, CartSummary, summarize};
use super::form::{FieldErrors, REQUIRED, required_text};
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{DeliveryDetails, DraftItem, Order, OrderDraft};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing in the cart to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart total is more than an order can record.
    #[error("order total {0} is too large")]
    TotalTooLarge(Price),

    /// The cart could not be priced.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Writing the order failed; nothing was stored.
    #[error("failed to write order: {0}")]
    Repository(#[from] RepositoryError),
}

/// Delivery form as submitted. Values are kept verbatim so the form can be
/// re-rendered with what the user typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub address_line1: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl CheckoutForm {
    /// Validate every field and produce trimmed delivery details.
    ///
    /// # Errors
    ///
    /// Returns all field errors at once so the form can show each of them.
    pub fn validate(&self) -> Result<DeliveryDetails, FieldErrors> {
        let mut errors = FieldErrors::default();

        let full_name = required_text(&mut errors, "full_name", &self.full_name, 120);
        let address_line1 = required_text(&mut errors, "address_line1", &self.address_line1, 200);
        let city = required_text(&mut errors, "city", &self.city, 120);
        let postcode = required_text(&mut errors, "postcode", &self.postcode, 20);
        let country = required_text(&mut errors, "country", &self.country, 60);

        let email = if self.email.trim().is_empty() {
            errors.add("email", REQUIRED);
            None
        } else {
            match Email::parse(&self.email) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.add("email", "Enter a valid email address.");
                    None
                }
            }
        };

        match (full_name, email, address_line1, city, postcode, country) {
            (
                Some(full_name),
                Some(email),
                Some(address_line1),
                Some(city),
                Some(postcode),
                Some(country),
            ) if errors.is_empty() => Ok(DeliveryDetails {
                full_name,
                email,
                address_line1,
                city,
                postcode,
                country,
            }),
            _ => Err(errors),
        }
    }
}

/// Build the order to write from a priced cart.
///
/// Each item snapshots the product's current price.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if the summary has no lines, or
/// `CheckoutError::TotalTooLarge` if the total exceeds
/// [`Price::MAX_ORDER_TOTAL`].
pub fn draft_order(
    summary: &CartSummary,
    user_id: Option<UserId>,
    delivery: DeliveryDetails,
) -> Result<OrderDraft, CheckoutError> {
    if summary.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if summary.total.amount() > Price::MAX_ORDER_TOTAL {
        return Err(CheckoutError::TotalTooLarge(summary.total));
    }

    let items = summary
        .items
        .iter()
        .map(|item| DraftItem {
            product_id: item.product.id,
            qty: item.qty,
            unit_price: item.product.price,
        })
        .collect();

    Ok(OrderDraft {
        user_id,
        delivery,
        total: summary.total,
        items,
    })
}

/// Price the cart and write the order with all of its items.
///
/// The caller clears the session cart once this returns `Ok`.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart, `CheckoutError::Cart`
/// if a line no longer resolves, or `CheckoutError::Repository` if the write
/// fails (in which case no order exists).
#[instrument(skip(pool, cart, delivery), fields(user_id = ?user_id))]
pub async fn create_order_from_cart(
    pool: &PgPool,
    cart: &Cart,
    user_id: Option<UserId>,
    delivery: DeliveryDetails,
) -> Result<Order, CheckoutError> {
    let summary = summarize(cart, &ProductRepository::new(pool)).await?;
    let draft = draft_order(&summary, user_id, delivery)?;
    let order = OrderRepository::new(pool).create_with_items(&draft).await?;

    tracing::info!(order_id = %order.id, total = %order.total, "Order created");
    Ok(order)
}
