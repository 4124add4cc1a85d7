//! Admin user list and activation toggle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use printshop_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireStaff};
use crate::models::User;
use crate::services::admin::may_toggle;
use crate::state::AppState;

const USERS_PATH: &str = "/admin-panel/users/";

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users_list.html")]
pub struct UsersListTemplate {
    pub ctx: PageContext,
    pub users: Vec<User>,
    /// The staff member viewing the list; their own row has no toggle.
    pub staff_id: UserId,
}

/// List all users, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool()).list_newest().await?;
    Ok(UsersListTemplate {
        ctx,
        users,
        staff_id: staff.id,
    })
}

/// Flip a user's active flag. Toggling yourself is ignored.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn toggle_active(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    let users = UserRepository::new(state.pool());
    let target = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    if !may_toggle(staff.id, target.id) {
        tracing::warn!("Staff tried to toggle their own account");
        return Ok(Redirect::to(USERS_PATH));
    }

    let is_active = !target.is_active;
    users.set_active(target.id, is_active).await?;
    tracing::info!(user_id = %target.id, is_active, "User active flag changed");

    Ok(Redirect::to(USERS_PATH))
}
