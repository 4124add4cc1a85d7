//! Per-page template context.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::current_user;
use crate::models::CurrentUser;
use crate::services::cart::SessionCart;

/// Values every storefront page shows in its header.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// The logged-in user, if any.
    pub user: Option<CurrentUser>,
    /// Total quantity in the cart.
    pub cart_count: u32,
}

impl PageContext {
    /// Build the context from the session. Never touches the database.
    pub async fn from_session(session: &Session) -> Self {
        let cart_count = match SessionCart::new(session).load().await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cart for header badge");
                0
            }
        };

        Self {
            user: current_user(session).await,
            cart_count,
        }
    }

    /// Whether to show the admin panel link.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_staff)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<Session>() {
            Some(session) => Self::from_session(session).await,
            None => Self::default(),
        })
    }
}
