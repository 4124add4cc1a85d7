//! Authentication route handlers.
//!
//! Handles registration, login and logout against the local user table.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, clear_current_user, safe_next, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::form::FieldErrors;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// `?next=` on the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

/// Register page template.
///
/// Passwords are never echoed back into the form.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
    pub form_error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(ctx: PageContext, Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        ctx,
        username: String::new(),
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_string(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, ctx, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).unwrap_or("/").to_string();

    match AuthService::new(state.pool())
        .login(form.username.trim(), &form.password)
        .await
    {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(&next).into_response())
        }
        Err(e @ (AuthError::InvalidCredentials | AuthError::Inactive)) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                ctx,
                username: form.username,
                next,
                error: Some(e.user_message()),
            }
            .into_response())
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(ctx: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        ctx,
        username: String::new(),
        email: String::new(),
        errors: FieldErrors::default(),
        form_error: None,
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new user in and goes to the home page.
#[instrument(skip(state, session, ctx, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = Registration {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        password_confirm: &form.password_confirm,
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(AppError::Auth(e)),
        Err(e) => {
            let mut errors = FieldErrors::default();
            let form_error = match e.field() {
                Some(field) => {
                    errors.add(field, e.user_message());
                    None
                }
                None => Some(e.user_message()),
            };

            Ok(RegisterTemplate {
                ctx,
                username: form.username,
                email: form.email,
                errors,
                form_error,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout (GET or POST).
///
/// Destroys the whole session, cart included.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    Redirect::to("/")
}
