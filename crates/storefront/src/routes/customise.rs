//! Customiser, design saving and the visitor's saved designs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use printshop_core::{GarmentSize, ProductId};

use crate::db::{DesignRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::{DesignListItem, Product};
use crate::services::designs::{DesignSubmission, save_design};
use crate::state::AppState;

/// Canvas size used when the template image size is unknown.
const DEFAULT_CANVAS: (u32, u32) = (600, 700);

/// Customiser page template.
#[derive(Template, WebTemplate)]
#[template(path = "customise.html")]
pub struct CustomiseTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub sizes: [GarmentSize; 4],
}

/// Saved designs template.
#[derive(Template, WebTemplate)]
#[template(path = "my_designs.html")]
pub struct MyDesignsTemplate {
    pub ctx: PageContext,
    pub designs: Vec<DesignListItem>,
}

/// Design form posted by the customiser script.
#[derive(Debug, Default, Deserialize)]
pub struct SaveDesignForm {
    pub design_data: Option<String>,
    pub preview_data_url: Option<String>,
    pub size: Option<String>,
}

impl SaveDesignForm {
    /// Both payloads, if present and non-blank.
    fn payloads(self) -> Option<(String, String, Option<GarmentSize>)> {
        let design_data = self.design_data.filter(|d| !d.trim().is_empty())?;
        let preview = self.preview_data_url.filter(|p| !p.trim().is_empty())?;
        let size = self.size.as_deref().and_then(GarmentSize::from_form);
        Some((design_data, preview, size))
    }
}

/// Display the customiser for a product.
#[instrument(skip(state, ctx, _user))]
pub async fn customise_page(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ctx: PageContext,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, product_id).await?;
    let (canvas_width, canvas_height) = product.template_size.unwrap_or(DEFAULT_CANVAS);

    Ok(CustomiseTemplate {
        ctx,
        product,
        canvas_width,
        canvas_height,
        sizes: GarmentSize::ALL,
    })
}

/// Save a design from the customiser.
///
/// A submission without a design or a preview goes back to the customiser.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<SaveDesignForm>,
) -> Result<Redirect> {
    let product = find_product(&state, product_id).await?;

    let Some((design_data, preview_data_url, size)) = form.payloads() else {
        tracing::debug!("Design form submitted without payload");
        return Ok(Redirect::to(&format!("/customise/{}/", product.id)));
    };

    save_design(
        &DesignRepository::new(state.pool()),
        state.media(),
        DesignSubmission {
            user_id: user.id,
            product_id: product.id,
            design_data,
            preview_data_url,
            size,
        },
    )
    .await?;

    Ok(Redirect::to("/my-designs/"))
}

/// List the current user's designs, newest first.
#[instrument(skip(state, user, ctx), fields(user_id = %user.id))]
pub async fn my_designs(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let designs = DesignRepository::new(state.pool())
        .list_newest(Some(user.id))
        .await?;

    Ok(MyDesignsTemplate { ctx, designs })
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
