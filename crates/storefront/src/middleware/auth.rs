//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user or an active staff
//! account in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{Method, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Login page path.
pub const LOGIN_PATH: &str = "/login/";

/// Extractor that requires a logged-in, active user.
///
/// The account is re-read on every request. If it has been deactivated or
/// deleted since login, the session is flushed and the visitor is sent to the
/// login page with a `next` parameter pointing back at the requested page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires an active staff account.
///
/// The user record is re-read on every request, so revoking staff access or
/// deactivating an account takes effect immediately.
pub struct RequireStaff(pub User);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Rejection for the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Nobody is logged in: redirect to the login page.
    RedirectToLogin { next: String },
    /// Logged in, but not allowed here.
    Forbidden,
    /// The user record could not be read.
    Internal(String),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Forbidden => AppError::Forbidden.into_response(),
            Self::Internal(reason) => AppError::Internal(reason).into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = load_active_user(parts, state).await?;
        Ok(Self(CurrentUser::from(&user)))
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = load_active_user(parts, state).await?;

        if user.has_staff_access() {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Staff access denied");
            Err(AuthRejection::Forbidden)
        }
    }
}

/// The session and the identity stored in it, if anyone is logged in.
async fn session_identity(parts: &Parts) -> Option<(Session, CurrentUser)> {
    let session = parts.extensions.get::<Session>()?.clone();
    let user = current_user(&session).await?;
    Some((session, user))
}

/// The account behind the session, if it still exists and is active.
fn active_account(user: Option<User>) -> Option<User> {
    user.filter(|user| user.is_active)
}

/// Load the logged-in user's current record.
///
/// A session whose account is gone or inactive is ended here.
async fn load_active_user(parts: &Parts, state: &AppState) -> Result<User, AuthRejection> {
    let login = || AuthRejection::RedirectToLogin {
        next: return_path(parts),
    };

    let (session, current) = session_identity(parts).await.ok_or_else(login)?;

    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await
        .map_err(|e| AuthRejection::Internal(format!("failed to load user: {e}")))?;

    if let Some(user) = active_account(user) {
        return Ok(user);
    }

    tracing::info!(user_id = %current.id, "Ending session of inactive or deleted account");
    clear_current_user(&session)
        .await
        .map_err(|e| AuthRejection::Internal(format!("failed to end session: {e}")))?;
    Err(login())
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Read the logged-in user from the session.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Log a user in: issue a fresh session ID and store their identity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(&user.id, Some(&user.username));
    Ok(())
}

/// Log out: discard the whole session, cart included.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

/// Login URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Accept a `next` redirect target only if it is a path on this site.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    local.then_some(next)
}

/// Where to come back to after logging in.
///
/// Only page loads return to themselves; a form submission returns home.
fn return_path(parts: &Parts) -> String {
    if parts.method == Method::GET || parts.method == Method::HEAD {
        parts
            .uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string())
    } else {
        "/".to_string()
    }
}
