//! Catalog and static page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use printshop_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Product;
use crate::state::AppState;

/// Number of products shown on the home page.
const HOME_PRODUCT_COUNT: i64 = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product_detail.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: Product,
}

/// Display the home page with the newest products.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool())
        .list_newest(Some(HOME_PRODUCT_COUNT))
        .await?;

    Ok(HomeTemplate { ctx, products })
}

/// Display every product, newest first.
#[instrument(skip(state, ctx))]
pub async fn shop(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool())
        .list_newest(None)
        .await?;

    Ok(ShopTemplate { ctx, products })
}

/// Display the about page.
pub async fn about(ctx: PageContext) -> impl IntoResponse {
    AboutTemplate { ctx }
}

/// Display a single product.
#[instrument(skip(state, ctx))]
pub async fn product_detail(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate { ctx, product })
}
