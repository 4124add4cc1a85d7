//! Admin design views.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use printshop_core::DesignId;

use crate::db::DesignRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireStaff};
use crate::models::DesignListItem;
use crate::state::AppState;

/// Design list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/designs_list.html")]
pub struct DesignsListTemplate {
    pub ctx: PageContext,
    pub designs: Vec<DesignListItem>,
}

/// Design detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/designs_detail.html")]
pub struct DesignDetailTemplate {
    pub ctx: PageContext,
    pub item: DesignListItem,
}

/// List every saved design, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let designs = DesignRepository::new(state.pool()).list_newest(None).await?;
    Ok(DesignsListTemplate { ctx, designs })
}

/// Show a design's payload and preview.
#[instrument(skip(state, _staff, ctx))]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
    Path(id): Path<DesignId>,
) -> Result<impl IntoResponse> {
    let item = DesignRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("design {id}")))?;

    Ok(DesignDetailTemplate { ctx, item })
}
