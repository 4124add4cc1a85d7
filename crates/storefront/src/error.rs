//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding with an HTML error page. Route handlers return
//! `Result<T, AppError>`.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::middleware::PageContext;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::media::MediaError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart could not be read or priced.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Uploaded file could not be stored.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Logged in, but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound)
            | Self::NotFound(_)
            | Self::Cart(CartError::UnknownProduct(_))
            | Self::Checkout(CheckoutError::Cart(CartError::UnknownProduct(_))) => {
                StatusCode::NOT_FOUND
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_)
            | Self::Checkout(CheckoutError::EmptyCart | CheckoutError::TotalTooLarge(_))
            | Self::Media(MediaError::Empty | MediaError::UnsupportedType(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(err) => match err {
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::InvalidCredentials | AuthError::Inactive => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the visitor.
    fn public_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Forbidden => "You do not have permission to view this page.".to_string(),
            Self::BadRequest(reason) => reason.clone(),
            Self::Media(MediaError::UnsupportedType(_)) => {
                "Upload a PNG, JPEG, GIF or WebP image.".to_string()
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty.".to_string(),
            Self::Checkout(CheckoutError::TotalTooLarge(_)) => {
                "This order is too large to place. Remove some items and try again.".to_string()
            }
            _ if self.status() == StatusCode::NOT_FOUND => {
                "The page you were looking for does not exist.".to_string()
            }
            // Don't expose internal error details to clients
            _ => "Something went wrong on our side. Please try again.".to_string(),
        }
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    ctx: PageContext,
    status: u16,
    title: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let page = ErrorTemplate {
            ctx: PageContext::default(),
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, page.message).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
