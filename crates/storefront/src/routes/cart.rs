//! Cart route handlers.
//!
//! The cart is kept in the session; every page load reprices it from the
//! catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use printshop_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::services::cart::{CartSummary, MAX_LINE_QTY, SessionCart, summarize};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    /// Quantity as typed. Missing or unusable values count as 1; large ones
    /// are capped at [`MAX_LINE_QTY`].
    pub qty: Option<String>,
}

impl AddToCartForm {
    fn quantity(&self) -> u32 {
        let Some(qty) = self.qty.as_deref().map(str::trim) else {
            return 1;
        };
        match qty.parse::<u32>() {
            Ok(0) => 1,
            Ok(q) => q.min(MAX_LINE_QTY),
            // All digits but too large for u32
            Err(_) if !qty.is_empty() && qty.bytes().all(|b| b.is_ascii_digit()) => MAX_LINE_QTY,
            Err(_) => 1,
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub summary: CartSummary,
}

/// Display the cart with current prices.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = SessionCart::new(&session).load().await?;
    let summary = summarize(&cart, &ProductRepository::new(state.pool())).await?;
    let ctx = PageContext::from_session(&session).await;

    Ok(CartTemplate { ctx, summary })
}

/// Add a product to the cart.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    if ProductRepository::new(state.pool()).get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let qty = form.quantity();
    let count = SessionCart::new(&session)
        .update(|cart| {
            cart.add(id, qty);
            cart.item_count()
        })
        .await?;

    tracing::info!(qty, cart_count = count, "Added to cart");
    Ok(Redirect::to("/cart/"))
}

/// Remove a product from the cart. Removing an absent product does nothing.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<ProductId>) -> Result<Redirect> {
    let removed = SessionCart::new(&session)
        .update(|cart| cart.remove(id))
        .await?;

    tracing::debug!(removed, "Removed from cart");
    Ok(Redirect::to("/cart/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(qty: Option<&str>) -> AddToCartForm {
        AddToCartForm {
            qty: qty.map(String::from),
        }
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(form(None).quantity(), 1);
        assert_eq!(form(Some("")).quantity(), 1);
        assert_eq!(form(Some("zero")).quantity(), 1);
        assert_eq!(form(Some("0")).quantity(), 1);
        assert_eq!(form(Some("-3")).quantity(), 1);
        assert_eq!(form(Some(" 3 ")).quantity(), 3);
    }

    #[test]
    fn test_oversized_quantity_is_capped() {
        assert_eq!(form(Some("99")).quantity(), 99);
        assert_eq!(form(Some("100")).quantity(), MAX_LINE_QTY);
        assert_eq!(form(Some("4294967295")).quantity(), MAX_LINE_QTY);
        assert_eq!(form(Some("99999999999999999999")).quantity(), MAX_LINE_QTY);
    }
}
