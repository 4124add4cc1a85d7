//! Checkout, simulated payment and order confirmation handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use printshop_core::OrderId;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, current_user};
use crate::models::{Order, OrderItem};
use crate::services::cart::{Cart, CartSummary, SessionCart, summarize};
use crate::services::checkout::{CheckoutForm, create_order_from_cart};
use crate::services::form::FieldErrors;
use crate::services::payment::mark_order_paid;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub summary: CartSummary,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "thank_you.html")]
pub struct ThankYouTemplate {
    pub ctx: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Display the delivery form. An empty cart goes back to the cart page.
#[instrument(skip(state, session))]
pub async fn checkout_page(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = SessionCart::new(&session).load().await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart/").into_response());
    }

    let summary = summarize(&cart, &ProductRepository::new(state.pool())).await?;
    let ctx = PageContext::from_session(&session).await;

    Ok(CheckoutTemplate {
        ctx,
        summary,
        form: CheckoutForm::default(),
        errors: FieldErrors::default(),
    }
    .into_response())
}

/// Validate the delivery form and turn the cart into a pending order.
///
/// On success the cart is emptied and the visitor continues to payment.
#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let carts = SessionCart::new(&session);
    let cart = carts.load().await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart/").into_response());
    }

    let delivery = match form.validate() {
        Ok(delivery) => delivery,
        Err(errors) => {
            let summary = summarize(&cart, &ProductRepository::new(state.pool())).await?;
            let ctx = PageContext::from_session(&session).await;
            return Ok(CheckoutTemplate {
                ctx,
                summary,
                form,
                errors,
            }
            .into_response());
        }
    };

    let user_id = current_user(&session).await.map(|u| u.id);
    let order = create_order_from_cart(state.pool(), &cart, user_id, delivery).await?;

    carts.store(&Cart::new()).await?;

    Ok(Redirect::to(&format!("/payment/{}/", order.id)).into_response())
}

/// Display the simulated payment form.
#[instrument(skip(state, ctx))]
pub async fn payment_page(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let (order, items) = load_order(&state, order_id).await?;
    Ok(PaymentTemplate { ctx, order, items })
}

/// Mark the order paid and show the confirmation.
#[instrument(skip(state))]
pub async fn pay(State(state): State<AppState>, Path(order_id): Path<OrderId>) -> Result<Redirect> {
    let order = mark_order_paid(state.pool(), order_id).await?;
    Ok(Redirect::to(&format!("/thank-you/{}/", order.id)))
}

/// Display the order confirmation.
#[instrument(skip(state, ctx))]
pub async fn thank_you(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let (order, items) = load_order(&state, order_id).await?;
    Ok(ThankYouTemplate { ctx, order, items })
}

async fn load_order(state: &AppState, order_id: OrderId) -> Result<(Order, Vec<OrderItem>)> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    let items = orders.items(order_id).await?;
    Ok((order, items))
}
