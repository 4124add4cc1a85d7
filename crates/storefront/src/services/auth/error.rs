//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username is blank, too long, or uses disallowed characters.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] printshop_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is inactive")]
    Inactive,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// The form field a validation failure belongs to, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUsername(_) | Self::UserAlreadyExists => Some("username"),
            Self::InvalidEmail(_) => Some("email"),
            Self::WeakPassword(_) => Some("password"),
            Self::PasswordMismatch => Some("password_confirm"),
            _ => None,
        }
    }

    /// Message shown to the user. Server-side failures stay generic.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUsername(reason) | Self::WeakPassword(reason) => reason.clone(),
            Self::InvalidEmail(_) => "Enter a valid email address.".to_string(),
            Self::InvalidCredentials | Self::Inactive => {
                "Please enter a correct username and password.".to_string()
            }
            Self::UserAlreadyExists => "A user with that username already exists.".to_string(),
            Self::PasswordMismatch => "The two password fields didn't match.".to_string(),
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
