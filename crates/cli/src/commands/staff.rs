//! Staff account management.

use printshop_core::{Email, UserId};
use printshop_storefront::services::auth::{AuthError, AuthService};

use super::{CommandError, connect};

/// Create a staff user who can sign in to the admin panel.
///
/// # Errors
///
/// Returns an error for an invalid email or password, a taken username, or a
/// database failure.
pub async fn create(
    username: &str,
    email: Option<&str>,
    password: &str,
) -> Result<UserId, CommandError> {
    let email = email
        .filter(|e| !e.trim().is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;

    let pool = connect().await?;

    tracing::info!("Creating staff user: {}", username);
    let user = AuthService::new(&pool)
        .create_user(username, email.as_ref(), password, true)
        .await?;

    tracing::info!(user_id = %user.id, "Staff user created");
    Ok(user.id)
}
